//! Adivina la portada de una pista a partir de las imágenes de su carpeta y
//! de la portada embebida.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tagsync_tags::{CoverImage, ImportFlags, ImportResult, MetadataSource, TagSyncConfig, TrackMetadata};
use tracing::{Level, debug, instrument, trace};

use crate::{
    cover_info::{CoverInfo, CoverLocation, PreferredCoverType},
    scanner::{FolderScanner, FsFolderScanner},
};

/// Pista a la que se le puede asignar una portada.
///
/// Se comparte entre hilos, así que `set_cover_info` recibe `&self`.
pub trait CoverArtTarget: Send + Sync {
    fn location(&self) -> PathBuf;
    fn album(&self) -> Option<String>;
    fn set_cover_info(&self, info: CoverInfo);
}

impl<T: CoverArtTarget + ?Sized> CoverArtTarget for Arc<T> {
    fn location(&self) -> PathBuf {
        (**self).location()
    }

    fn album(&self) -> Option<String> {
        (**self).album()
    }

    fn set_cover_info(&self, info: CoverInfo) {
        (**self).set_cover_info(info)
    }
}

fn stem_eq(path: &Path, name: &str) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.to_lowercase() == name.to_lowercase())
}

/// Elige entre `covers` la imagen para la pista; no mira la portada embebida.
///
/// Por orden: mismo nombre que la pista, nombre del álbum y después
/// cover, front, album y folder.
pub fn select_cover_art_for_track(track_path: &Path, album: Option<&str>, covers: &[PathBuf]) -> CoverInfo {
    let find = |name: &str| covers.iter().find(|c| stem_eq(c, name)).cloned();

    let track_stem = track_path.file_stem().and_then(|s| s.to_str());
    if let Some(path) = track_stem.and_then(find) {
        return CoverInfo::from_file(path, PreferredCoverType::TrackBasename);
    }

    let album = album.map(str::trim).filter(|a| !a.is_empty());
    if let Some(path) = album.and_then(find) {
        return CoverInfo::from_file(path, PreferredCoverType::AlbumName);
    }

    PreferredCoverType::GENERIC
        .iter()
        .find_map(|&(name, preferred)| find(name).map(|path| CoverInfo::from_file(path, preferred)))
        .unwrap_or_default()
}

/// Guarda las imágenes de la última carpeta visitada.
///
/// Pensado para recorrer pistas agrupadas por carpeta: cada cambio de carpeta
/// vuelve a listar el disco. No es para compartir entre hilos; cada tarea
/// concurrente crea el suyo.
#[derive(Debug)]
pub struct CoverInfoGuesser<S = FsFolderScanner> {
    scanner: S,
    config: Arc<TagSyncConfig>,
    cached_folder: Option<PathBuf>,
    cached_covers: Vec<PathBuf>,
}

impl CoverInfoGuesser {
    pub fn new() -> Self {
        Self::with_scanner(FsFolderScanner)
    }
}

impl Default for CoverInfoGuesser {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FolderScanner> CoverInfoGuesser<S> {
    pub fn with_scanner(scanner: S) -> Self {
        CoverInfoGuesser {
            scanner,
            config: Arc::new(TagSyncConfig::default()),
            cached_folder: None,
            cached_covers: Vec::new(),
        }
    }

    /// Configuración usada al leer la portada embebida.
    pub fn with_config(mut self, config: Arc<TagSyncConfig>) -> Self {
        self.config = config;
        self
    }

    fn covers_in(&mut self, folder: &Path) -> &[PathBuf] {
        if self.cached_folder.as_deref() == Some(folder) {
            trace!(folder = %folder.display(), "cover cache hit");
        } else {
            debug!(folder = %folder.display(), "scanning folder for covers");
            self.cached_covers = self.scanner.scan(folder);
            self.cached_folder = Some(folder.to_path_buf());
        }
        &self.cached_covers
    }

    /// La portada embebida ya tiene que venir extraída en `embedded`.
    pub fn guess_cover_info(&mut self, track_path: &Path, album: Option<&str>, embedded: Option<&CoverImage>) -> CoverInfo {
        let folder = match track_path.parent() {
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
            None => Path::new("."),
        };

        let info = select_cover_art_for_track(track_path, album, self.covers_in(folder));
        if !info.is_none() {
            return info;
        }

        match embedded {
            Some(cover) => CoverInfo {
                location: CoverLocation::Embedded,
                preferred: PreferredCoverType::None,
                hash: Some(cover.hash()),
            },
            None => CoverInfo::default(),
        }
    }

    /// Extrae la portada embebida del fichero de la pista y adivina.
    #[instrument(level = Level::DEBUG, skip_all)]
    pub fn guess_cover_info_for_track<T: CoverArtTarget + ?Sized>(&mut self, track: &T) -> CoverInfo {
        let location = track.location();
        let mut metadata = TrackMetadata::default();
        let source = MetadataSource::probe(&location).with_config(self.config.clone());
        let embedded = match source.import(&mut metadata, ImportFlags::COVER, false) {
            (ImportResult::Succeeded, _) => metadata.cover,
            (result, _) => {
                trace!(?result, "no embedded cover read");
                None
            }
        };

        self.guess_cover_info(&location, track.album().as_deref(), embedded.as_ref())
    }

    pub fn guess_and_set_cover_info_for_track<T: CoverArtTarget + ?Sized>(&mut self, track: &T) {
        let info = self.guess_cover_info_for_track(track);
        track.set_cover_info(info);
    }

    /// Procesa las pistas en orden; agruparlas por carpeta aprovecha la caché.
    pub fn guess_and_set_cover_info_for_tracks<T: CoverArtTarget>(&mut self, tracks: &[T]) {
        for track in tracks {
            self.guess_and_set_cover_info_for_track(track);
        }
    }
}
