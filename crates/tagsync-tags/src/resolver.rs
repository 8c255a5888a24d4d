//! Orden de precedencia entre tipos de tag por formato.
//!
//! Son datos puros: qué tags se prueban al importar (sólo se lee el primero
//! presente, nunca se mezclan) y qué regla decide cuáles se escriben al exportar.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::FileFormat;

/// Contenedor de metadatos que puede vivir dentro de un formato.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Id3v2,
    Ape,
    /// Tag heredado de campos fijos (ID3v1).
    Id3v1,
    VorbisComments,
    Mp4Ilst,
    RiffInfo,
    /// Chunks de texto NAME/AUTH/ANNO de AIFF.
    AiffText,
}

impl TagKind {
    /// Los tags heredados no guardan portada.
    pub fn carries_cover(&self) -> bool {
        !matches!(self, TagKind::Id3v1 | TagKind::RiffInfo | TagKind::AiffText)
    }

    /// Bit del tipo en `ModifiedTags`; los tipos que nunca se escriben no tienen.
    pub fn flag(&self) -> ModifiedTags {
        match self {
            TagKind::Id3v2 => ModifiedTags::ID3V2,
            TagKind::Ape => ModifiedTags::APE,
            TagKind::Id3v1 => ModifiedTags::ID3V1,
            TagKind::VorbisComments => ModifiedTags::VORBIS_COMMENTS,
            TagKind::Mp4Ilst => ModifiedTags::MP4_ILST,
            TagKind::RiffInfo => ModifiedTags::RIFF_INFO,
            TagKind::AiffText => ModifiedTags::empty(),
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagKind::Id3v2 => "ID3v2",
            TagKind::Ape => "APE",
            TagKind::Id3v1 => "ID3v1",
            TagKind::VorbisComments => "VorbisComments",
            TagKind::Mp4Ilst => "MP4 ilst",
            TagKind::RiffInfo => "RIFF INFO",
            TagKind::AiffText => "AIFF text chunks",
        };
        f.write_str(name)
    }
}

bitflags::bitflags! {
    /// Tags que una exportación ha cambiado de verdad.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModifiedTags: u8 {
        const ID3V2           = 1 << 0;
        const APE             = 1 << 1;
        const ID3V1           = 1 << 2;
        const VORBIS_COMMENTS = 1 << 3;
        const MP4_ILST        = 1 << 4;
        const RIFF_INFO       = 1 << 5;
    }
}

/// Regla de escritura de un formato.
///
/// Si `preferred` existe en el fichero (y se puede escribir) se escribe, y
/// entonces `primary` sólo se toca si ya existe. Si no, `primary` se obtiene
/// o se crea. `legacy` nunca se crea: si ya está se actualiza cuando alguno
/// de los anteriores cambió.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportRule {
    pub preferred: Option<TagKind>,
    pub primary: TagKind,
    pub legacy: Option<TagKind>,
}

const MP3_IMPORT: &[TagKind] = &[TagKind::Id3v2, TagKind::Ape, TagKind::Id3v1];
const MP4_IMPORT: &[TagKind] = &[TagKind::Mp4Ilst];
const FLAC_IMPORT: &[TagKind] = &[TagKind::VorbisComments, TagKind::Id3v2];
const OGG_IMPORT: &[TagKind] = &[TagKind::VorbisComments];
const WAVPACK_IMPORT: &[TagKind] = &[TagKind::Ape];
const WAV_IMPORT: &[TagKind] = &[TagKind::Id3v2, TagKind::RiffInfo];
const AIFF_IMPORT: &[TagKind] = &[TagKind::Id3v2, TagKind::AiffText];

const MP3_EXPORT: ExportRule = ExportRule {
    preferred: Some(TagKind::Ape),
    primary: TagKind::Id3v2,
    legacy: Some(TagKind::Id3v1),
};
const MP4_EXPORT: ExportRule = ExportRule {
    preferred: None,
    primary: TagKind::Mp4Ilst,
    legacy: None,
};
const FLAC_EXPORT: ExportRule = ExportRule {
    preferred: Some(TagKind::Id3v2),
    primary: TagKind::VorbisComments,
    legacy: None,
};
const OGG_EXPORT: ExportRule = ExportRule {
    preferred: None,
    primary: TagKind::VorbisComments,
    legacy: None,
};
const WAVPACK_EXPORT: ExportRule = ExportRule {
    preferred: None,
    primary: TagKind::Ape,
    legacy: None,
};
const WAV_EXPORT: ExportRule = ExportRule {
    preferred: Some(TagKind::Id3v2),
    primary: TagKind::RiffInfo,
    legacy: None,
};
const AIFF_EXPORT: ExportRule = ExportRule {
    preferred: None,
    primary: TagKind::Id3v2,
    legacy: None,
};

/// Tags a probar al importar, en orden.
pub fn import_order(format: FileFormat) -> &'static [TagKind] {
    match format {
        FileFormat::Mp3 => MP3_IMPORT,
        FileFormat::Mp4 => MP4_IMPORT,
        FileFormat::Flac => FLAC_IMPORT,
        FileFormat::Ogg | FileFormat::Opus => OGG_IMPORT,
        FileFormat::WavPack => WAVPACK_IMPORT,
        FileFormat::Wav => WAV_IMPORT,
        FileFormat::Aiff => AIFF_IMPORT,
        FileFormat::Unknown => &[],
    }
}

/// Regla de exportación, o `None` si el formato no tiene backend.
pub fn export_rule(format: FileFormat) -> Option<ExportRule> {
    match format {
        FileFormat::Mp3 => Some(MP3_EXPORT),
        FileFormat::Mp4 => Some(MP4_EXPORT),
        FileFormat::Flac => Some(FLAC_EXPORT),
        FileFormat::Ogg | FileFormat::Opus => Some(OGG_EXPORT),
        FileFormat::WavPack => Some(WAVPACK_EXPORT),
        FileFormat::Wav => Some(WAV_EXPORT),
        FileFormat::Aiff => Some(AIFF_EXPORT),
        FileFormat::Unknown => None,
    }
}
