use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Users, units or branding could not be fetched. Fatal to the render call.
    #[error("reference data unavailable ({what}): {message}")]
    ReferenceData { what: &'static str, message: String },

    #[error("failed to load template configuration: {0}")]
    Config(Box<figment::Error>),

    #[error("invalid template: {message}")]
    InvalidTemplate { message: String },

    #[error("font {path}: {message}")]
    Font { path: PathBuf, message: String },

    #[error("rendering failed: {0}")]
    Render(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
