use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("malformed signal snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("field `{field}` must be a finite non-negative number, got {value}")]
    OutOfDomain { field: &'static str, value: f64 },
    #[error("computed score is not a finite number")]
    NonFinite,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read scoring config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scoring config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scoring config: {0}")]
    Invalid(String),
}
