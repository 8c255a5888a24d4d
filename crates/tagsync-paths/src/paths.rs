use std::{env, path::PathBuf};

use directories::ProjectDirs;

use crate::{errors::Error, fs_utils};

/// Nombre de la ENV var para override de ruta base (modo “portable”)
pub const ENV_BASE_DIR: &str = "TAGSYNC_BASE_DIR";

/// Rutas donde vive la configuración del sincronizador
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSyncPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
}

impl TagSyncPaths {
    /// Calcula las rutas sin crear nada en disco.
    pub fn new() -> Result<Self, Error> {
        let config_dir = if let Ok(base) = env::var(ENV_BASE_DIR) {
            PathBuf::from(base).join("config")
        } else {
            let proj = ProjectDirs::from("com", "MyOrg", "TagSync").ok_or(Error::NoHome)?;
            proj.config_dir().to_path_buf()
        };

        Ok(Self::with_config_dir(config_dir))
    }

    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        TagSyncPaths {
            settings_file: config_dir.join("tagsync.toml"),
            config_dir,
        }
    }

    /// Crea la carpeta de configuración si falta.
    pub fn ensure_structure(&self) -> Result<(), Error> {
        fs_utils::ensure_dir(&self.config_dir)
    }
}
