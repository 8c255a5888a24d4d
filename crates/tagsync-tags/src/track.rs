use std::time::Duration;

use derive_builder::Builder;
use lofty::{
    picture::{Picture, PictureType},
    properties::FileProperties,
};
use sha2::{Digest, Sha256};

/// Registro de metadatos de una pista. Lo posee quien llama; import escribe
/// en él y export lo lee.
#[derive(Debug, Clone, PartialEq, Default, Builder)]
#[builder(setter(into), default)]
pub struct TrackMetadata {
    pub tags: TagInfo,
    pub audio: AudioInfo,
    pub cover: Option<CoverImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct TagInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,

    pub track_number: Option<u32>,
    pub track_total: Option<u32>,
    pub disc_number: Option<u32>,
    pub disc_total: Option<u32>,

    pub genre: Option<String>,
    pub composer: Option<String>,
    pub grouping: Option<String>,
    pub comment: Option<String>,
    pub publisher: Option<String>,
    pub key: Option<String>,
    /// Fecha tal cual aparece en el tag ("2024", "2024-03-01"...)
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioInfo {
    pub duration: Duration,
    pub bitrate_kbps: Option<u32>,
    pub sample_rate_hz: Option<u32>,
    pub channels: Option<u8>,
    pub bit_depth: Option<u8>,
}

impl From<&FileProperties> for AudioInfo {
    fn from(props: &FileProperties) -> Self {
        AudioInfo {
            duration: props.duration(),
            bitrate_kbps: props.audio_bitrate().or_else(|| props.overall_bitrate()),
            sample_rate_hz: props.sample_rate(),
            channels: props.channels(),
            bit_depth: props.bit_depth(),
        }
    }
}

/// Imagen de portada embebida, sin decodificar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub data: Vec<u8>,
    pub mime_type: Option<String>,
    pub description: Option<String>,
}

impl CoverImage {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        CoverImage {
            data: data.into(),
            mime_type: None,
            description: None,
        }
    }

    /// Elige la portada frontal o, si no hay, la primera imagen.
    pub fn from_pictures<'a>(pictures: impl IntoIterator<Item = &'a Picture>) -> Option<Self> {
        let pictures: Vec<&Picture> = pictures.into_iter().collect();

        pictures
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first())
            .filter(|p| !p.data().is_empty())
            .map(|p| CoverImage {
                data: p.data().to_vec(),
                mime_type: p.mime_type().map(|m| m.as_str().to_owned()),
                description: p.description().map(str::to_owned),
            })
    }

    /// Hash SHA-256 en hexadecimal del contenido.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.data);
        hex::encode(hasher.finalize())
    }

    /// Extensión de fichero para guardar la imagen en disco.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_deref() {
            Some("image/png") => "png",
            Some("image/gif") => "gif",
            Some("image/bmp") => "bmp",
            _ => "jpg",
        }
    }
}
