use thiserror::Error;

use crate::asset::ProviderError;
use crate::core::config::ConfigError;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid scene input: {0}")]
    Input(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ResolveError {
    /// Subsystem tag printed in front of fatal messages.
    pub fn subsystem(&self) -> &'static str {
        match self {
            ResolveError::Input(_) => "scene",
            ResolveError::NotFound(_) => "resolver",
            ResolveError::Provider(_) => "provider",
            ResolveError::Config(_) => "config",
            ResolveError::Io(_) | ResolveError::Serde(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
