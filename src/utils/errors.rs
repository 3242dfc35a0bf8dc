use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Physics error: {0}")]
    Physics(String),

    #[error("Vehicle error: {0}")]
    Vehicle(String),

    #[error("State error: {0}")]
    State(String),
}
