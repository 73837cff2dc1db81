//! sl-config: locomotive definition files.
//!
//! Provides:
//! - The YAML/JSON schema for a locomotive (boiler, firebox, engines,
//!   feedwater, auxiliaries, tender, adhesion and telemetry)
//! - Structural validation and conservative repair of out-of-range values
//! - Construction of a ready-to-run [`sl_sim::SteamLocomotive`]
//!
//! Loading always repairs: every substituted value is logged once with
//! `tracing::warn!`, and only structural problems are returned as errors.

pub mod build;
pub mod schema;
pub mod validate;

pub use build::{build_engine, build_locomotive, build_spec};
pub use schema::*;
pub use validate::{Substitution, ValidationError, repair_locomotive, validate_locomotive};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Build error: {0}")]
    Sim(#[from] sl_sim::SimError),

    #[error("Engine error: {0}")]
    Engine(#[from] sl_engine::EngineError),

    #[error("Component error: {0}")]
    Component(#[from] sl_components::ComponentError),
}

/// Parse a YAML definition and repair it.
pub fn from_yaml_str(content: &str) -> ConfigResult<LocomotiveDef> {
    let mut def: LocomotiveDef = serde_yaml::from_str(content)?;
    repair_locomotive(&mut def)?;
    Ok(def)
}

pub fn load_yaml(path: &std::path::Path) -> ConfigResult<LocomotiveDef> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &std::path::Path, def: &LocomotiveDef) -> ConfigResult<()> {
    validate_locomotive(def)?;
    let content = serde_yaml::to_string(def)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ConfigResult<LocomotiveDef> {
    let content = std::fs::read_to_string(path)?;
    let mut def: LocomotiveDef = serde_json::from_str(&content)?;
    repair_locomotive(&mut def)?;
    Ok(def)
}

pub fn save_json(path: &std::path::Path, def: &LocomotiveDef) -> ConfigResult<()> {
    validate_locomotive(def)?;
    let content = serde_json::to_string_pretty(def)?;
    std::fs::write(path, content)?;
    Ok(())
}
