use miette::Diagnostic;
use thiserror::Error;

use crate::access::errors::LoadError;

#[derive(Debug, Error, Diagnostic)]
pub enum WardenError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(warden::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(warden::config))]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error("Transport error: {0}")]
    #[diagnostic(code(warden::transport))]
    Transport(String),
}
