use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};
use tracing::debug;

/// Extensiones de imagen que cuentan como portada en disco.
pub const COVER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

/// Nombre (sin extensión) de la portada que se genera junto a una pista.
pub const DEFAULT_COVER_FILE_NAME: &str = "cover";

/// Heurística que eligió la portada, de más a menos preferida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PreferredCoverType {
    TrackBasename,
    AlbumName,
    Cover,
    Front,
    Album,
    Folder,
    #[default]
    None,
}

impl PreferredCoverType {
    /// Nombres genéricos en el orden en que se prueban.
    pub(crate) const GENERIC: [(&'static str, PreferredCoverType); 4] = [
        ("cover", PreferredCoverType::Cover),
        ("front", PreferredCoverType::Front),
        ("album", PreferredCoverType::Album),
        ("folder", PreferredCoverType::Folder),
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CoverLocation {
    #[default]
    None,
    Embedded,
    File(PathBuf),
}

/// Portada adivinada para una pista. Se calcula de nuevo para cada pista.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoverInfo {
    pub location: CoverLocation,
    pub preferred: PreferredCoverType,
    /// SHA-256 en hexadecimal del contenido de la imagen
    pub hash: Option<String>,
}

impl CoverInfo {
    pub(crate) fn from_file(path: PathBuf, preferred: PreferredCoverType) -> Self {
        let hash = hash_file(&path);
        CoverInfo {
            location: CoverLocation::File(path),
            preferred,
            hash,
        }
    }

    pub fn is_none(&self) -> bool {
        self.location == CoverLocation::None
    }
}

pub(crate) fn has_cover_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| COVER_EXTENSIONS.iter().any(|c| c.eq_ignore_ascii_case(ext)))
}

fn hash_file(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            Some(hex::encode(hasher.finalize()))
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cover file not readable, no hash");
            None
        }
    }
}
