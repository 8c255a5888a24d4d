use std::{
    fs,
    path::{Path, PathBuf},
};

use tagsync_paths::{SafelyWritableFile, SafetyMode};
use tagsync_tags::CoverImage;
use tracing::{Level, debug, info, instrument};

use crate::{cover_info::DEFAULT_COVER_FILE_NAME, error::CoverError};

/// Ruta de la portada por defecto junto a `track_path` para esta imagen.
pub fn default_cover_location(track_path: &Path, cover: &CoverImage) -> Result<PathBuf, CoverError> {
    let folder = track_path
        .parent()
        .ok_or_else(|| CoverError::NoFolder(track_path.to_path_buf()))?;
    Ok(folder.join(format!("{DEFAULT_COVER_FILE_NAME}.{}", cover.extension())))
}

/// Vuelca una portada embebida a `cover.<ext>` en la carpeta de la pista.
///
/// Si ese fichero ya existe no se toca y se devuelve su ruta.
#[instrument(level = Level::DEBUG, skip(cover), err)]
pub fn save_embedded_cover(track_path: &Path, cover: &CoverImage) -> Result<PathBuf, CoverError> {
    let dest = default_cover_location(track_path, cover)?;
    if dest.exists() {
        debug!(dest = %dest.display(), "default cover already present");
        return Ok(dest);
    }

    let file = SafelyWritableFile::new(&dest, SafetyMode::Replace)?;
    fs::write(file.file_name(), &cover.data)?;
    file.commit()?;

    info!(dest = %dest.display(), bytes = cover.data.len(), "saved embedded cover");
    Ok(dest)
}
