use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("invalid {field} pattern '{pattern}': {message}")]
    InvalidPattern {
        field: String,
        pattern: String,
        message: String,
    },
    #[error("invalid assay profile '{profile}': {message}")]
    InvalidProfile { profile: String, message: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
