//! Adaptador sobre los tipos de fichero concretos de lofty.
//!
//! Un único enum lleva el fichero abierto de cada formato y todo el
//! despacho por formato/tipo de tag ocurre en un `match`.

use std::{fs::File, path::Path};

use lofty::{
    ape::ApeTag,
    config::{ParseOptions, WriteOptions},
    file::AudioFile,
    flac::FlacFile,
    id3::{v1::Id3v1Tag, v2::Id3v2Tag},
    iff::{
        aiff::AiffFile,
        wav::{RiffInfoList, WavFile},
    },
    mp4::{Ilst, Mp4File},
    mpeg::MpegFile,
    ogg::{OggPictureStorage, OpusFile, VorbisComments, VorbisFile},
    picture::Picture,
    properties::FileProperties,
    tag::{MergeTag, SplitTag, Tag, TagExt},
    wavpack::WavPackFile,
};
use tracing::{debug, trace};

use crate::{error::Error, format::FileFormat, mapping, resolver::TagKind, track::TagInfo};

pub(crate) enum TaggedAudioFile {
    Mpeg(MpegFile),
    Mp4(Mp4File),
    Flac(FlacFile),
    Vorbis(VorbisFile),
    Opus(OpusFile),
    WavPack(WavPackFile),
    Wav(WavFile),
    Aiff(AiffFile),
}

fn read<F: AudioFile>(path: &Path, options: ParseOptions) -> Result<F, Error> {
    let mut file = File::open(path)?;
    Ok(F::read_from(&mut file, options)?)
}

fn generic<T: Clone + Into<Tag>>(tag: Option<&T>) -> Option<Tag> {
    tag.cloned().map(Into::into)
}

/// Escribe `info` en un tag concreto pasando por el `Tag` genérico, sin perder
/// lo que el genérico no sabe representar. Devuelve si el tag cambió.
fn export_into_tag<T>(tag: &mut T, info: &TagInfo) -> bool
where
    T: SplitTag + Default + Clone + PartialEq,
    T::Remainder: MergeTag<Merged = T>,
{
    let original = tag.clone();
    let (remainder, mut generic) = std::mem::take(tag).split_tag();
    mapping::export_tag_info(&mut generic, info);
    *tag = remainder.merge_tag(generic);
    *tag != original
}

/// Igual que `export_into_tag` pero sobre un hueco que puede estar vacío.
/// Sin `create` un hueco vacío no se toca; un tag recién creado que queda
/// igual que vacío no se añade al fichero.
fn export_into_slot<F, T>(
    file: &mut F,
    create: bool,
    info: &TagInfo,
    get_mut: impl FnOnce(&mut F) -> Option<&mut T>,
    set: impl FnOnce(&mut F, T),
) -> Option<bool>
where
    T: SplitTag + Default + Clone + PartialEq,
    T::Remainder: MergeTag<Merged = T>,
{
    match get_mut(file) {
        Some(tag) => Some(export_into_tag(tag, info)),
        None if create => {
            let mut tag = T::default();
            let modified = export_into_tag(&mut tag, info);
            if modified {
                set(file, tag);
            }
            Some(modified)
        }
        None => None,
    }
}

impl TaggedAudioFile {
    pub(crate) fn open(format: FileFormat, path: &Path, options: ParseOptions) -> Result<Self, Error> {
        let file = match format {
            FileFormat::Mp3 => Self::Mpeg(read(path, options)?),
            FileFormat::Mp4 => Self::Mp4(read(path, options)?),
            FileFormat::Flac => Self::Flac(read(path, options)?),
            FileFormat::Ogg => Self::Vorbis(read(path, options)?),
            FileFormat::Opus => Self::Opus(read(path, options)?),
            FileFormat::WavPack => Self::WavPack(read(path, options)?),
            FileFormat::Wav => Self::Wav(read(path, options)?),
            FileFormat::Aiff => Self::Aiff(read(path, options)?),
            FileFormat::Unknown => return Err(Error::Unsupported(format)),
        };
        trace!(path = %path.display(), %format, "opened tagged file");
        Ok(file)
    }

    pub(crate) fn properties(&self) -> FileProperties {
        match self {
            Self::Mpeg(f) => f.properties().clone().into(),
            Self::Mp4(f) => f.properties().clone().into(),
            Self::Flac(f) => f.properties().clone().into(),
            Self::Vorbis(f) => f.properties().clone().into(),
            Self::Opus(f) => f.properties().clone().into(),
            Self::WavPack(f) => f.properties().clone().into(),
            Self::Wav(f) => f.properties().clone().into(),
            Self::Aiff(f) => f.properties().clone().into(),
        }
    }

    /// El tag de tipo `kind` convertido al genérico, si el fichero lo tiene.
    pub(crate) fn tag(&self, kind: TagKind) -> Option<Tag> {
        match (self, kind) {
            (Self::Mpeg(f), TagKind::Id3v2) => generic(f.id3v2()),
            (Self::Mpeg(f), TagKind::Ape) => generic(f.ape()),
            (Self::Mpeg(f), TagKind::Id3v1) => generic(f.id3v1()),
            (Self::Mp4(f), TagKind::Mp4Ilst) => generic(f.ilst()),
            (Self::Flac(f), TagKind::VorbisComments) => generic(f.vorbis_comments()),
            (Self::Flac(f), TagKind::Id3v2) => generic(f.id3v2()),
            (Self::Vorbis(f), TagKind::VorbisComments) => generic(Some(f.vorbis_comments())),
            (Self::Opus(f), TagKind::VorbisComments) => generic(Some(f.vorbis_comments())),
            (Self::WavPack(f), TagKind::Ape) => generic(f.ape()),
            (Self::Wav(f), TagKind::Id3v2) => generic(f.id3v2()),
            (Self::Wav(f), TagKind::RiffInfo) => generic(f.riff_info()),
            (Self::Aiff(f), TagKind::Id3v2) => generic(f.id3v2()),
            (Self::Aiff(f), TagKind::AiffText) => generic(f.text_chunks()),
            _ => None,
        }
    }

    pub(crate) fn has_tag(&self, kind: TagKind) -> bool {
        match (self, kind) {
            (Self::Mpeg(f), TagKind::Id3v2) => f.id3v2().is_some(),
            (Self::Mpeg(f), TagKind::Ape) => f.ape().is_some(),
            (Self::Mpeg(f), TagKind::Id3v1) => f.id3v1().is_some(),
            (Self::Mp4(f), TagKind::Mp4Ilst) => f.ilst().is_some(),
            (Self::Flac(f), TagKind::VorbisComments) => f.vorbis_comments().is_some(),
            (Self::Flac(f), TagKind::Id3v2) => f.id3v2().is_some(),
            (Self::Vorbis(_) | Self::Opus(_), TagKind::VorbisComments) => true,
            (Self::WavPack(f), TagKind::Ape) => f.ape().is_some(),
            (Self::Wav(f), TagKind::Id3v2) => f.id3v2().is_some(),
            (Self::Wav(f), TagKind::RiffInfo) => f.riff_info().is_some(),
            (Self::Aiff(f), TagKind::Id3v2) => f.id3v2().is_some(),
            (Self::Aiff(f), TagKind::AiffText) => f.text_chunks().is_some(),
            _ => false,
        }
    }

    /// Tipos que se leen pero no se reescriben: el ID3v2 delante de un FLAC y
    /// los chunks de texto de AIFF.
    pub(crate) fn can_write(&self, kind: TagKind) -> bool {
        !matches!((self, kind), (Self::Flac(_), TagKind::Id3v2) | (_, TagKind::AiffText))
    }

    /// Imágenes de los bloques PICTURE de FLAC, fuera del tag de comentarios.
    pub(crate) fn picture_list(&self) -> Vec<&Picture> {
        match self {
            Self::Flac(f) => f.pictures().iter().map(|(picture, _)| picture).collect(),
            _ => Vec::new(),
        }
    }

    /// Escribe `info` en el tag `kind`.
    ///
    /// `None` si el tag no existe y no se pidió crearlo (o no se puede
    /// escribir en este formato); `Some(modified)` en otro caso.
    pub(crate) fn export_into(&mut self, kind: TagKind, create: bool, info: &TagInfo) -> Option<bool> {
        match (self, kind) {
            (Self::Mpeg(f), TagKind::Id3v2) => export_into_slot(f, create, info, MpegFile::id3v2_mut, |f, t: Id3v2Tag| {
                f.set_id3v2(t);
            }),
            (Self::Mpeg(f), TagKind::Ape) => export_into_slot(f, create, info, MpegFile::ape_mut, |f, t: ApeTag| {
                f.set_ape(t);
            }),
            (Self::Mpeg(f), TagKind::Id3v1) => export_into_slot(f, create, info, MpegFile::id3v1_mut, |f, t: Id3v1Tag| {
                f.set_id3v1(t);
            }),
            (Self::Mp4(f), TagKind::Mp4Ilst) => export_into_slot(f, create, info, Mp4File::ilst_mut, |f, t: Ilst| {
                f.set_ilst(t);
            }),
            (Self::Flac(f), TagKind::VorbisComments) => {
                let inherited = f.id3v2().filter(|_| create && f.vorbis_comments().is_none()).cloned();
                match inherited {
                    // el bloque nuevo hereda lo que traía el ID3v2, que se pierde al guardar
                    Some(id3v2) => {
                        let mut comments = VorbisComments::from(Tag::from(id3v2));
                        export_into_tag(&mut comments, info);
                        f.set_vorbis_comments(comments);
                        Some(true)
                    }
                    None => export_into_slot(f, create, info, FlacFile::vorbis_comments_mut, |f, t: VorbisComments| {
                        f.set_vorbis_comments(t);
                    }),
                }
            }
            (Self::Vorbis(f), TagKind::VorbisComments) => Some(export_into_tag(f.vorbis_comments_mut(), info)),
            (Self::Opus(f), TagKind::VorbisComments) => Some(export_into_tag(f.vorbis_comments_mut(), info)),
            (Self::WavPack(f), TagKind::Ape) => export_into_slot(f, create, info, WavPackFile::ape_mut, |f, t: ApeTag| {
                f.set_ape(t);
            }),
            (Self::Wav(f), TagKind::Id3v2) => export_into_slot(f, create, info, WavFile::id3v2_mut, |f, t: Id3v2Tag| {
                f.set_id3v2(t);
            }),
            (Self::Wav(f), TagKind::RiffInfo) => {
                export_into_slot(f, create, info, WavFile::riff_info_mut, |f, t: RiffInfoList| {
                    f.set_riff_info(t);
                })
            }
            (Self::Aiff(f), TagKind::Id3v2) => export_into_slot(f, create, info, AiffFile::id3v2_mut, |f, t: Id3v2Tag| {
                f.set_id3v2(t);
            }),
            _ => None,
        }
    }

    /// Guarda el fichero completo en `path` (normalmente la copia temporal).
    ///
    /// Un ID3v2 delante de un FLAC se elimina: lofty rechaza guardar el
    /// fichero mientras ese tag tenga contenido.
    pub(crate) fn save_to_path(&mut self, path: &Path, options: WriteOptions) -> Result<(), Error> {
        if let Self::Flac(f) = self {
            if f.id3v2().is_some_and(|tag| !tag.is_empty()) {
                debug!(path = %path.display(), "dropping ID3v2 tag in front of FLAC stream");
                f.set_id3v2(Id3v2Tag::default());
            }
        }
        match self {
            Self::Mpeg(f) => f.save_to_path(path, options)?,
            Self::Mp4(f) => f.save_to_path(path, options)?,
            Self::Flac(f) => f.save_to_path(path, options)?,
            Self::Vorbis(f) => f.save_to_path(path, options)?,
            Self::Opus(f) => f.save_to_path(path, options)?,
            Self::WavPack(f) => f.save_to_path(path, options)?,
            Self::Wav(f) => f.save_to_path(path, options)?,
            Self::Aiff(f) => f.save_to_path(path, options)?,
        }
        Ok(())
    }
}
