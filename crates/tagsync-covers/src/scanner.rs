use std::path::{Path, PathBuf};

use tracing::{Level, debug, instrument};
use walkdir::{DirEntry, WalkDir};

use crate::cover_info::has_cover_extension;

/// Listado de imágenes candidatas de una carpeta.
pub trait FolderScanner {
    fn scan(&self, folder: &Path) -> Vec<PathBuf>;
}

/// Lee la carpeta del disco.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFolderScanner;

impl FolderScanner for FsFolderScanner {
    fn scan(&self, folder: &Path) -> Vec<PathBuf> {
        find_possible_covers_in_folder(folder)
    }
}

/// Ficheros de imagen directamente dentro de `folder`, ordenados por nombre.
/// No entra en subcarpetas y no sigue enlaces.
#[instrument(level = Level::TRACE)]
pub fn find_possible_covers_in_folder(folder: &Path) -> Vec<PathBuf> {
    WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && has_cover_extension(e.path()))
        .map(DirEntry::into_path)
        .collect()
}
