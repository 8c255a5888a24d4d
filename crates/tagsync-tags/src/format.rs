use std::{ffi::OsStr, fmt, path::Path, str::FromStr};

use lofty::{file::FileType, probe::Probe};
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, instrument};

/// Tipo de contenedor de un fichero de audio, detectado una vez por operación.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Mp3,
    Mp4,
    Flac,
    Ogg,
    Opus,
    WavPack,
    Wav,
    Aiff,
    Unknown,
}

impl FileFormat {
    pub const SUPPORTED: &'static [FileFormat] = &[
        FileFormat::Mp3,
        FileFormat::Mp4,
        FileFormat::Flac,
        FileFormat::Ogg,
        FileFormat::Opus,
        FileFormat::WavPack,
        FileFormat::Wav,
        FileFormat::Aiff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Mp3 => "mp3",
            FileFormat::Mp4 => "mp4",
            FileFormat::Flac => "flac",
            FileFormat::Ogg => "ogg",
            FileFormat::Opus => "opus",
            FileFormat::WavPack => "wv",
            FileFormat::Wav => "wav",
            FileFormat::Aiff => "aiff",
            FileFormat::Unknown => "unknown",
        }
    }

    pub fn is_supported(&self) -> bool {
        *self != FileFormat::Unknown
    }

    /// Detecta el formato a partir de la extensión, sin leer el fichero.
    pub fn from_path(path: &Path) -> FileFormat {
        path.extension()
            .and_then(OsStr::to_str)
            .and_then(|ext| ext.parse().ok())
            .unwrap_or(FileFormat::Unknown)
    }

    /// Detecta el formato leyendo la cabecera; la extensión sólo es una pista.
    #[instrument(level = Level::TRACE)]
    pub fn probe(path: &Path) -> FileFormat {
        let file_type = Probe::open(path)
            .ok()
            .and_then(|p| p.guess_file_type().ok())
            .and_then(|p| p.file_type());

        match file_type {
            Some(ft) => ft.into(),
            None => {
                debug!(path = %path.display(), "could not probe file type");
                FileFormat::Unknown
            }
        }
    }
}

impl From<FileType> for FileFormat {
    fn from(ft: FileType) -> Self {
        match ft {
            FileType::Mpeg => FileFormat::Mp3,
            FileType::Mp4 => FileFormat::Mp4,
            FileType::Flac => FileFormat::Flac,
            FileType::Vorbis => FileFormat::Ogg,
            FileType::Opus => FileFormat::Opus,
            FileType::WavPack => FileFormat::WavPack,
            FileType::Wav => FileFormat::Wav,
            FileType::Aiff => FileFormat::Aiff,
            _ => FileFormat::Unknown,
        }
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(FileFormat::Mp3),
            "m4a" | "m4b" | "mp4" => Ok(FileFormat::Mp4),
            "flac" => Ok(FileFormat::Flac),
            "ogg" | "oga" => Ok(FileFormat::Ogg),
            "opus" => Ok(FileFormat::Opus),
            "wv" => Ok(FileFormat::WavPack),
            "wav" => Ok(FileFormat::Wav),
            "aif" | "aiff" | "aifc" => Ok(FileFormat::Aiff),
            _ => Err(format!("Extension not supported: {}", s)),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
