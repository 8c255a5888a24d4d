use std::time::SystemTime;

use tracing::{Level, debug, instrument, trace, warn};

use crate::{
    backend::TaggedAudioFile,
    error::Error,
    mapping,
    resolver::{TagKind, import_order},
    source::{ImportFlags, ImportResult, MetadataSource},
    track::{AudioInfo, CoverImage, TrackMetadata},
};

impl MetadataSource {
    /// Lee metadatos y/o portada del primer tag presente según el orden de
    /// precedencia del formato. Nunca mezcla datos de varios tags.
    ///
    /// Devuelve también la fecha de modificación del fichero tras la lectura.
    #[instrument(level = Level::DEBUG, skip_all, fields(path = %self.path.display(), format = %self.format))]
    pub fn import(
        &self,
        track: &mut TrackMetadata,
        flags: ImportFlags,
        reset_missing: bool,
    ) -> (ImportResult, Option<SystemTime>) {
        let result = self.import_into(track, flags, reset_missing);
        let synchronized_at = self.synchronized_at();
        debug_assert!(
            result != ImportResult::Succeeded || synchronized_at.is_some(),
            "successful import without modification time"
        );
        (result, synchronized_at)
    }

    fn import_into(&self, track: &mut TrackMetadata, flags: ImportFlags, reset_missing: bool) -> ImportResult {
        if !flags.intersects(ImportFlags::METADATA | ImportFlags::COVER) {
            return ImportResult::Unavailable;
        }

        let file = match self.open_for_import() {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "failed to read file");
                return ImportResult::Failed;
            }
        };

        if flags.contains(ImportFlags::METADATA) {
            track.audio = AudioInfo::from(&file.properties());
        }

        let Some((kind, tag)) = import_order(self.format)
            .iter()
            .find_map(|&kind| file.tag(kind).map(|tag| (kind, tag)))
        else {
            debug!("no recognized tag");
            return ImportResult::Unavailable;
        };
        trace!(%kind, "reading tag");

        if flags.contains(ImportFlags::METADATA) {
            match kind {
                TagKind::AiffText => mapping::import_text_chunks(&mut track.tags, &tag),
                _ => mapping::import_tag_info(&mut track.tags, &tag, reset_missing),
            }
        }

        if flags.contains(ImportFlags::COVER) {
            let mut cover = if kind.carries_cover() {
                CoverImage::from_pictures(tag.pictures())
            } else {
                None
            };
            // FLAC guarda además bloques PICTURE fuera del tag
            if cover.is_none() {
                cover = CoverImage::from_pictures(file.picture_list());
                if cover.is_some() {
                    debug!("cover taken from picture blocks");
                }
            }
            track.cover = cover;
        }

        ImportResult::Succeeded
    }

    fn open_for_import(&self) -> Result<TaggedAudioFile, Error> {
        let file = TaggedAudioFile::open(self.format, &self.path, self.config.parse_options())?;
        if file.properties().sample_rate().is_none_or(|rate| rate == 0) {
            return Err(Error::AudioProperties(self.path.clone()));
        }
        Ok(file)
    }
}
