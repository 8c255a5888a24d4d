use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use tagsync_paths::{AtomicRename, ReplaceFile, fs_utils};

use crate::{config::TagSyncConfig, format::FileFormat};

bitflags::bitflags! {
    /// Qué se quiere leer en una importación.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ImportFlags: u8 {
        const METADATA = 1 << 0;
        const COVER    = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportResult {
    /// Se leyeron metadatos y/o portada de un tag reconocido.
    Succeeded,
    /// El fichero abre pero no hay tag reconocido, o no se pidió nada.
    Unavailable,
    /// El fichero no se pudo leer como su formato.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportResult {
    Succeeded,
    /// Fallo de preparación, de escritura, de commit, o nada que guardar.
    Failed,
    /// El formato no tiene backend.
    Unsupported,
}

/// Un fichero de audio como origen y destino de metadatos.
///
/// El formato se decide al construirlo y no cambia durante las operaciones.
#[derive(Debug, Clone)]
pub struct MetadataSource {
    pub(crate) path: PathBuf,
    pub(crate) format: FileFormat,
    pub(crate) config: Arc<TagSyncConfig>,
    pub(crate) replacer: Arc<dyn ReplaceFile>,
}

impl MetadataSource {
    pub fn new(path: impl Into<PathBuf>, format: FileFormat) -> Self {
        MetadataSource {
            path: path.into(),
            format,
            config: Arc::new(TagSyncConfig::default()),
            replacer: Arc::new(AtomicRename),
        }
    }

    /// Detecta el formato leyendo el fichero.
    pub fn probe(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = FileFormat::probe(&path);
        Self::new(path, format)
    }

    pub fn with_config(mut self, config: Arc<TagSyncConfig>) -> Self {
        self.config = config;
        self
    }

    /// Estrategia de sustitución usada al hacer commit de una exportación.
    pub fn with_replacer(mut self, replacer: Arc<dyn ReplaceFile>) -> Self {
        self.replacer = replacer;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Momento de sincronización: la fecha de modificación actual del fichero.
    pub(crate) fn synchronized_at(&self) -> Option<SystemTime> {
        fs_utils::modified_at(&self.path)
    }
}
