use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use derive_builder::Builder;
use lofty::config::{ParseOptions, ParsingMode as LoftyParsingMode, WriteOptions};
use serde::{Deserialize, Serialize};
use tagsync_paths::TagSyncPaths;

use crate::error::ConfigError;

/// Qué tan estricto es el parser de tags
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParsingMode {
    Strict,
    #[default]
    BestAttempt,
    Relaxed,
}

impl From<ParsingMode> for LoftyParsingMode {
    fn from(mode: ParsingMode) -> Self {
        match mode {
            ParsingMode::Strict => LoftyParsingMode::Strict,
            ParsingMode::BestAttempt => LoftyParsingMode::BestAttempt,
            ParsingMode::Relaxed => LoftyParsingMode::Relaxed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct TagSyncConfig {
    pub parsing_mode: ParsingMode,
    /// Escribir ID3v2.3 en vez de ID3v2.4
    pub use_id3v23: bool,
    /// Padding preferido al reescribir tags, en bytes
    pub preferred_padding: Option<u32>,
    /// Comprobar permisos de escritura antes de exportar
    pub check_writable: bool,
}

impl Default for TagSyncConfig {
    fn default() -> Self {
        TagSyncConfig {
            parsing_mode: ParsingMode::default(),
            use_id3v23: false,
            preferred_padding: None,
            check_writable: true,
        }
    }
}

impl TagSyncConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let cfg = Config::builder()
            .add_source(File::new(&path, FileFormat::Toml))
            .add_source(Environment::with_prefix("TAGSYNC").try_parsing(true))
            .build()
            .map_err(ConfigError::Parse)?;
        let tc = cfg
            .try_deserialize::<TagSyncConfig>()
            .map_err(ConfigError::Parse)?;
        Ok(tc)
    }

    /// Carga la configuración del sitio por defecto, o los valores por
    /// defecto si el fichero no existe.
    pub fn load() -> Result<Self, ConfigError> {
        let paths = TagSyncPaths::new()?;
        if paths.settings_file.exists() {
            Self::from_file(&paths.settings_file)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            tagsync_paths::fs_utils::ensure_dir(dir)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub(crate) fn parse_options(&self) -> ParseOptions {
        ParseOptions::new().parsing_mode(self.parsing_mode.into())
    }

    pub(crate) fn write_options(&self) -> WriteOptions {
        let options = WriteOptions::new().use_id3v23(self.use_id3v23);
        match self.preferred_padding {
            Some(padding) => options.preferred_padding(padding),
            None => options,
        }
    }
}
