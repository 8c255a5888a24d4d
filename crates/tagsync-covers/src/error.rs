use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Paths(#[from] tagsync_paths::Error),

    #[error("track has no parent folder: {0}")]
    NoFolder(PathBuf),
}
