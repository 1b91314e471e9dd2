//! JSON API for host-engine integration.

pub mod json_api;

pub use json_api::{simulate_skirmish_json, SkirmishRequest, SkirmishResponse};
