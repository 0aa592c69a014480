//! Error types

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProverError {
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Invalid value {value:?} for option {option}")]
    InvalidOptionValue { option: String, value: String },

    #[error("Invalid strategy code {code:?}: {reason}")]
    InvalidStrategyCode { code: String, reason: String },

    #[error("Schedule contains no usable strategies")]
    EmptySchedule,

    #[error("Unsupported formula: {0}")]
    UnsupportedFormula(String),

    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProverError>;
