//! Crate `tagsync_paths`: rutas, utilidades de ficheros y reescritura segura

mod errors;
pub mod fs_utils;
mod paths;
mod safe_file;

pub use errors::Error;
pub use paths::{ENV_BASE_DIR, TagSyncPaths};
pub use safe_file::{AtomicRename, ReplaceFile, SafelyWritableFile, SafetyMode};

pub use tempfile::TempPath;
