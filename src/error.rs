//! Error types for roster

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn telemetry(msg: impl Into<String>) -> Self {
        Error::Telemetry(msg.into())
    }
}
