//! Error types for loading and serving the dashboard

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A required dataset could not be read from disk
    #[error("failed to read {resource}: {source}")]
    Read {
        resource: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A required dataset was read but is not valid for its schema
    #[error("failed to parse {resource}: {source}")]
    Parse {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("server error: {0}")]
    Server(String),
}

impl Error {
    /// Name of the dataset this error is about, if any
    pub fn resource(&self) -> Option<&'static str> {
        match self {
            Error::Read { resource, .. } | Error::Parse { resource, .. } => Some(resource),
            _ => None,
        }
    }
}
