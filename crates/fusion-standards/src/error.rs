#![deny(unsafe_code)]

use std::path::PathBuf;

use fusion_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("unknown assay profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid assay profile in {origin}: {source}")]
    InvalidProfile {
        origin: String,
        #[source]
        source: ModelError,
    },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
