//! Reescritura segura de ficheros: se edita una copia temporal en la misma
//! carpeta y sólo al hacer `commit()` se reemplaza el original de forma atómica.

use std::{
    fmt,
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use tempfile::{Builder, TempPath};
use tracing::{Level, debug, instrument, warn};

use crate::{errors::Error, fs_utils};

/// Cómo se prepara el fichero temporal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyMode {
    /// El temporal empieza siendo una copia exacta del destino.
    Edit,
    /// El temporal empieza vacío; el destino puede no existir todavía.
    Replace,
}

/// Estrategia para sustituir el destino por el temporal ya escrito.
pub trait ReplaceFile: Send + Sync + fmt::Debug {
    fn replace(&self, temp: TempPath, target: &Path) -> io::Result<()>;
}

/// Rename atómico dentro del mismo sistema de ficheros.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtomicRename;

impl ReplaceFile for AtomicRename {
    fn replace(&self, temp: TempPath, target: &Path) -> io::Result<()> {
        // Si falla, el TempPath del error se suelta y borra el temporal
        temp.persist(target).map_err(|e| e.error)
    }
}

/// Copia temporal de un fichero que sólo sustituye al original tras `commit()`.
///
/// Si se suelta sin hacer commit el temporal se borra y el original queda
/// intacto byte a byte.
pub struct SafelyWritableFile {
    target: PathBuf,
    temp: TempPath,
    replacer: Arc<dyn ReplaceFile>,
}

impl fmt::Debug for SafelyWritableFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafelyWritableFile")
            .field("target", &self.target)
            .field("temp", &self.temp.to_path_buf())
            .field("replacer", &self.replacer)
            .finish()
    }
}

impl SafelyWritableFile {
    pub fn new(target: impl Into<PathBuf>, mode: SafetyMode) -> Result<Self, Error> {
        Self::with_replacer(target, mode, Arc::new(AtomicRename))
    }

    #[instrument(level = Level::DEBUG, skip(target, replacer), fields(target), err)]
    pub fn with_replacer(
        target: impl Into<PathBuf>,
        mode: SafetyMode,
        replacer: Arc<dyn ReplaceFile>,
    ) -> Result<Self, Error> {
        let target = target.into();
        tracing::Span::current().record("target", tracing::field::display(target.display()));

        let dir = match target.parent() {
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
            None => return Err(Error::NoParent(target)),
        };

        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::NotAFile(target.clone()))?;

        let mut temp = Builder::new()
            .prefix(&format!(".{name}."))
            .suffix(".tmp")
            .tempfile_in(dir)?;

        if mode == SafetyMode::Edit {
            let meta = fs::metadata(&target)?;
            if !meta.is_file() {
                return Err(Error::NotAFile(target));
            }

            let mut original = File::open(&target)?;
            io::copy(&mut original, temp.as_file_mut())?;
            temp.as_file().sync_all()?;
            fs::set_permissions(temp.path(), meta.permissions())?;
        }

        // Cerramos el handle: quien edite el temporal lo reabre por ruta
        let temp = temp.into_temp_path();
        debug!(temp = %temp.display(), "temporary copy ready");

        Ok(SafelyWritableFile {
            target,
            temp,
            replacer,
        })
    }

    /// Igual que `new` pero comprobando antes que el destino es escribible.
    pub fn checked(target: impl Into<PathBuf>, mode: SafetyMode, replacer: Arc<dyn ReplaceFile>) -> Result<Self, Error> {
        let target = target.into();
        if mode == SafetyMode::Edit || target.exists() {
            fs_utils::check_writable(&target)?;
        }
        Self::with_replacer(target, mode, replacer)
    }

    /// Ruta del fichero temporal, para editarlo in situ.
    pub fn file_name(&self) -> &Path {
        &self.temp
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Sustituye el destino por el temporal.
    #[instrument(level = Level::DEBUG, skip(self), fields(target = %self.target.display()), err)]
    pub fn commit(self) -> Result<(), Error> {
        let SafelyWritableFile {
            target,
            temp,
            replacer,
        } = self;

        replacer.replace(temp, &target).map_err(|source| {
            warn!(error = %source, "could not replace file with its temporary copy");
            Error::Commit { path: target, source }
        })
    }
}
