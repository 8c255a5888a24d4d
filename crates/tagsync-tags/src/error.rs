use std::path::PathBuf;

use lofty::error::LoftyError;
use thiserror::Error;

use crate::format::FileFormat;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lofty(#[from] LoftyError),

    #[error(transparent)]
    Paths(#[from] tagsync_paths::Error),

    #[error("Unsupported format: {0}")]
    Unsupported(FileFormat),

    #[error("Could not read audio properties of {0}")]
    AudioProperties(PathBuf),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error(transparent)]
    Paths(#[from] tagsync_paths::Error),
}
