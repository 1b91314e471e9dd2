//! Tactical Combat CLI
//!
//! Runs scripted skirmish scenarios from JSON files and inspects the
//! embedded weapon catalog. Thin wrapper over the `tc_core` JSON API.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tc_cli")]
#[command(about = "Run tactical combat skirmishes from scenario files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a skirmish scenario JSON file
    Run {
        /// Scenario file (SkirmishRequest JSON)
        scenario: PathBuf,

        /// Override the scenario's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write the full response JSON here
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the embedded weapon catalog
    Weapons,

    /// Validate a weapon definitions JSON file
    Validate {
        /// Weapon definitions file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { scenario, seed, out } => run_scenario(&scenario, seed, out.as_deref()),
        Commands::Weapons => list_weapons(),
        Commands::Validate { file } => validate_weapons(&file),
    }
}

fn run_scenario(path: &std::path::Path, seed: Option<u64>, out: Option<&std::path::Path>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;

    let request = match seed {
        Some(seed) => {
            let mut value: serde_json::Value =
                serde_json::from_str(&raw).context("scenario is not valid JSON")?;
            value["seed"] = serde_json::json!(seed);
            value.to_string()
        }
        None => raw,
    };

    let response = tc_core::simulate_skirmish_json(&request).map_err(|e| anyhow!(e))?;
    let parsed: serde_json::Value = serde_json::from_str(&response)?;

    println!("Skirmish complete ({} ticks)", parsed["ticks_run"]);

    if let Some(commands) = parsed["commands"].as_array() {
        for command in commands {
            let verdict = if command["accepted"].as_bool().unwrap_or(false) {
                "accepted".to_string()
            } else {
                format!("rejected: {}", command["rejection"].as_str().unwrap_or("?"))
            };
            println!(
                "  tick {:>5}  #{} -> #{}  {}",
                command["tick"], command["attacker"], command["target"], verdict
            );
        }
    }

    let mut shots = 0usize;
    let mut hits = 0usize;
    let mut downs = 0usize;
    if let Some(events) = parsed["events"].as_array() {
        for event in events {
            match event["kind"].as_str() {
                Some("attack_executed") => shots += 1,
                Some("hit") => hits += 1,
                Some("combatant_downed") => downs += 1,
                _ => {}
            }
        }
    }
    println!("  shots: {}  hits: {}  downed: {}", shots, hits, downs);

    if let Some(combatants) = parsed["combatants"].as_array() {
        for combatant in combatants {
            println!(
                "  #{} {:<16} health {:>6.1}  {}  [{}]",
                combatant["id"],
                combatant["name"].as_str().unwrap_or("?"),
                combatant["health"].as_f64().unwrap_or(0.0),
                if combatant["alive"].as_bool().unwrap_or(false) { "alive" } else { "down " },
                combatant["weapon_state"].as_str().unwrap_or("?"),
            );
        }
    }

    if let Some(out_path) = out {
        std::fs::write(out_path, &response)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        println!("Response written to {}", out_path.display());
    }

    Ok(())
}

fn list_weapons() -> Result<()> {
    for weapon in tc_core::data::default_weapons() {
        let (category, detail) = match &weapon.class {
            tc_core::WeaponClass::Ranged { range_m, accuracy, ammunition_capacity } => (
                "ranged",
                format!("range {:>5.1}m  accuracy {:.2}  ammo {}", range_m, accuracy, ammunition_capacity),
            ),
            tc_core::WeaponClass::Melee { reach_m } => {
                ("melee", format!("reach {:>5.1}m", reach_m))
            }
        };
        println!(
            "{:<10} {:<20} {:<7} damage {:>5.1}  {}  ({} states)",
            weapon.id,
            weapon.name,
            category,
            weapon.damage,
            detail,
            weapon.states.len()
        );
    }
    Ok(())
}

fn validate_weapons(path: &std::path::Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let weapons = tc_core::data::load_weapon_definitions(&raw)?;
    for weapon in &weapons {
        println!("ok: {} ({})", weapon.id, weapon.name);
    }
    println!("{} weapon definitions valid", weapons.len());
    Ok(())
}
