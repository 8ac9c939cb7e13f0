//! Error types for fenton_karma_rs

use thiserror::Error;

use crate::parameters::Variable;

#[derive(Debug, Error)]
pub enum FentonKarmaError {
    /// Rejected before any step runs: bad dt, t_max, parameter keys or values
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Only raised when range checking is set to strict
    #[error("State variable {variable} left its plausible range at step {step}: {value}")]
    OutOfRangeState {
        variable: Variable,
        value: f64,
        step: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FentonKarmaError>;
