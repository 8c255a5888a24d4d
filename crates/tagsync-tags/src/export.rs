use std::{path::Path, time::SystemTime};

use lofty::config::WriteOptions;
use tagsync_paths::{SafelyWritableFile, SafetyMode};
use tracing::{Level, debug, info, instrument, trace, warn};

use crate::{
    backend::TaggedAudioFile,
    error::Error,
    resolver::{ExportRule, ModifiedTags, TagKind, export_rule},
    source::{ExportResult, MetadataSource},
    track::{TagInfo, TrackMetadata},
};

/// Fichero abierto para exportar más los tags que ya se han cambiado en él.
struct TagSaver {
    file: TaggedAudioFile,
    modified: ModifiedTags,
}

impl TagSaver {
    fn new(file: TaggedAudioFile) -> Self {
        TagSaver {
            file,
            modified: ModifiedTags::empty(),
        }
    }

    /// Aplica la regla de exportación del formato. Un tag preferido que no se
    /// puede reescribir cuenta como ausente.
    fn apply(&mut self, rule: ExportRule, info: &TagInfo) {
        let preferred = rule.preferred.filter(|&kind| {
            let present = self.file.has_tag(kind);
            if present && !self.file.can_write(kind) {
                debug!(%kind, "preferred tag is read-only here, ignoring it");
                return false;
            }
            present
        });
        match preferred {
            Some(preferred) => {
                self.write(preferred, false, info);
                self.write(rule.primary, false, info);
            }
            None => self.write(rule.primary, true, info),
        }

        if let Some(legacy) = rule.legacy {
            if !self.modified.is_empty() {
                self.write(legacy, false, info);
            }
        }
    }

    fn write(&mut self, kind: TagKind, create: bool, info: &TagInfo) {
        match self.file.export_into(kind, create, info) {
            Some(true) => {
                trace!(%kind, "tag modified");
                self.modified |= kind.flag();
            }
            Some(false) => trace!(%kind, "tag unchanged"),
            None => trace!(%kind, "tag absent, skipped"),
        }
    }

    fn modified_tags(&self) -> ModifiedTags {
        self.modified
    }

    fn save(mut self, path: &Path, options: WriteOptions) -> Result<(), Error> {
        self.file.save_to_path(path, options)
    }
}

impl MetadataSource {
    /// Escribe los metadatos de `track` en el fichero.
    ///
    /// Todo se edita en una copia temporal que sólo sustituye al original si
    /// el guardado termina bien; en cualquier fallo el original no se toca.
    #[instrument(level = Level::DEBUG, skip_all, fields(path = %self.path.display(), format = %self.format))]
    pub fn export(&self, track: &TrackMetadata) -> (ExportResult, Option<SystemTime>) {
        let result = self.export_from(track);
        let synchronized_at = self.synchronized_at();
        debug_assert!(
            result != ExportResult::Succeeded || synchronized_at.is_some(),
            "successful export without modification time"
        );
        (result, synchronized_at)
    }

    fn export_from(&self, track: &TrackMetadata) -> ExportResult {
        let Some(rule) = export_rule(self.format) else {
            debug!("no tag backend for format");
            return ExportResult::Unsupported;
        };

        let safe_file = match self.prepare_safe_file() {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "could not prepare temporary copy");
                return ExportResult::Failed;
            }
        };

        let mut saver = match TaggedAudioFile::open(self.format, safe_file.file_name(), self.config.parse_options()) {
            Ok(file) => TagSaver::new(file),
            Err(e) => {
                warn!(error = %e, "failed to open temporary copy");
                return ExportResult::Failed;
            }
        };

        saver.apply(rule, &track.tags);
        let modified = saver.modified_tags();
        if modified.is_empty() {
            debug!("no tag modified, nothing to save");
            return ExportResult::Failed;
        }

        info!(?modified, "writing tags");
        // `save` consume el saver: no queda ningún handle abierto al temporal
        if let Err(e) = saver.save(safe_file.file_name(), self.config.write_options()) {
            warn!(error = %e, "failed to save tags");
            return ExportResult::Failed;
        }

        match safe_file.commit() {
            Ok(()) => ExportResult::Succeeded,
            Err(e) => {
                warn!(error = %e, "failed to replace original file");
                ExportResult::Failed
            }
        }
    }

    fn prepare_safe_file(&self) -> Result<SafelyWritableFile, Error> {
        let file = if self.config.check_writable {
            SafelyWritableFile::checked(&self.path, SafetyMode::Edit, self.replacer.clone())?
        } else {
            SafelyWritableFile::with_replacer(&self.path, SafetyMode::Edit, self.replacer.clone())?
        };
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io, path::Path, sync::Arc};

    use lofty::{
        config::ParseOptions,
        file::AudioFile,
        flac::FlacFile,
        iff::wav::WavFile,
        mpeg::MpegFile,
        ogg::OggPictureStorage,
        tag::{Accessor, ItemKey, Tag},
    };
    use tagsync_paths::{ReplaceFile, TempPath};
    use tempfile::tempdir;

    use crate::{
        format::FileFormat,
        source::ImportFlags,
        test_support,
        track::{TagInfoBuilder, TrackMetadata},
    };

    use super::*;

    #[derive(Debug)]
    struct FailingReplace;

    impl ReplaceFile for FailingReplace {
        fn replace(&self, _temp: TempPath, _target: &Path) -> io::Result<()> {
            Err(io::Error::other("simulated commit failure"))
        }
    }

    fn titled(title: &str) -> TrackMetadata {
        TrackMetadata {
            tags: TagInfoBuilder::default().title(title).artist("Someone").build().unwrap(),
            ..Default::default()
        }
    }

    fn full() -> TrackMetadata {
        TrackMetadata {
            tags: TagInfoBuilder::default()
                .title("One More Time")
                .artist("Daft Punk")
                .album("Discovery")
                .album_artist("Daft Punk")
                .track_number(1u32)
                .track_total(14u32)
                .disc_number(1u32)
                .disc_total(1u32)
                .genre("House")
                .composer("Bangalter")
                .comment("radio edit")
                .publisher("Virgin")
                .key("D")
                .year("2000")
                .build()
                .unwrap(),
            ..Default::default()
        }
    }

    fn read<F: AudioFile>(path: &Path) -> F {
        let mut file = fs::File::open(path).unwrap();
        F::read_from(&mut file, ParseOptions::new()).unwrap()
    }

    fn read_mpeg(path: &Path) -> MpegFile {
        read(path)
    }

    fn reimport(source: &MetadataSource) -> TrackMetadata {
        let mut back = TrackMetadata::default();
        let (result, _) = source.import(&mut back, ImportFlags::METADATA | ImportFlags::COVER, true);
        assert_eq!(result, crate::source::ImportResult::Succeeded);
        back
    }

    #[test]
    fn mp3_roundtrip_through_new_id3v2() {
        test_support::init_tracing();
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("song.mp3");
        test_support::write_mp3(&path);
        let source = MetadataSource::probe(&path);

        let (result, at) = source.export(&full());
        assert_eq!(result, ExportResult::Succeeded);
        assert!(at.is_some());
        assert!(read_mpeg(&path).id3v2().is_some());

        let mut back = TrackMetadata::default();
        source.import(&mut back, ImportFlags::METADATA, true);
        assert_eq!(back.tags, full().tags);
    }

    #[test]
    fn mp3_with_ape_does_not_create_id3v2() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("ape.mp3");
        test_support::write_mp3(&path);
        test_support::add_ape(&path, "Old");
        let source = MetadataSource::probe(&path);

        let (result, _) = source.export(&titled("New title"));
        assert_eq!(result, ExportResult::Succeeded);

        let file = read_mpeg(&path);
        assert!(file.id3v2().is_none());
        assert!(file.ape().is_some());

        let mut back = TrackMetadata::default();
        source.import(&mut back, ImportFlags::METADATA, true);
        assert_eq!(back.tags.title.as_deref(), Some("New title"));
        assert_eq!(back.tags.artist.as_deref(), Some("Someone"));
    }

    #[test]
    fn mp3_with_both_writes_both() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("both.mp3");
        test_support::write_mp3(&path);
        test_support::add_id3v2(&path, "Old");
        test_support::add_ape(&path, "Old");

        let (result, _) = MetadataSource::probe(&path).export(&titled("Fresh"));
        assert_eq!(result, ExportResult::Succeeded);

        let file = read_mpeg(&path);
        let id3v2: Tag = file.id3v2().cloned().unwrap().into();
        let ape: Tag = file.ape().cloned().unwrap().into();
        assert_eq!(id3v2.get_string(&ItemKey::TrackArtist), Some("Someone"));
        assert_eq!(ape.get_string(&ItemKey::TrackArtist), Some("Someone"));
    }

    #[test]
    fn mp3_ape_roundtrip_keeps_every_field_ape_can_hold() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("ape.mp3");
        test_support::write_mp3(&path);
        test_support::add_ape(&path, "Old");
        let source = MetadataSource::probe(&path);

        let (result, _) = source.export(&full());
        assert_eq!(result, ExportResult::Succeeded);
        assert!(read_mpeg(&path).id3v2().is_none());

        // APE no tiene clave para la tonalidad
        let mut expected = full().tags;
        expected.key = None;
        assert_eq!(reimport(&source).tags, expected);
    }

    #[test]
    fn mp3_keeps_existing_id3v1_in_sync() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("v1.mp3");
        test_support::write_mp3(&path);
        test_support::add_id3v1(&path, "Old");

        let (result, _) = MetadataSource::probe(&path).export(&titled("New"));
        assert_eq!(result, ExportResult::Succeeded);

        let file = read_mpeg(&path);
        assert!(file.id3v2().is_some());
        let id3v1 = file.id3v1().unwrap();
        assert_eq!(id3v1.title().as_deref(), Some("New"));
        assert_eq!(id3v1.artist().as_deref(), Some("Someone"));
    }

    #[test]
    fn mp3_without_id3v1_does_not_get_one() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("song.mp3");
        test_support::write_mp3(&path);

        let (result, _) = MetadataSource::probe(&path).export(&titled("New"));
        assert_eq!(result, ExportResult::Succeeded);
        assert!(read_mpeg(&path).id3v1().is_none());
    }

    #[test]
    fn wav_roundtrip_through_riff_info() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("song.wav");
        test_support::write_wav(&path);
        let source = MetadataSource::probe(&path);

        let mut track = titled("Wave");
        track.tags.album = Some("Riff".into());
        let (result, _) = source.export(&track);
        assert_eq!(result, ExportResult::Succeeded);

        let mut back = TrackMetadata::default();
        let (result, _) = source.import(&mut back, ImportFlags::METADATA, true);
        assert_eq!(result, crate::source::ImportResult::Succeeded);
        assert_eq!(back.tags.title.as_deref(), Some("Wave"));
        assert_eq!(back.tags.artist.as_deref(), Some("Someone"));
        assert_eq!(back.tags.album.as_deref(), Some("Riff"));
        assert_eq!(back.audio.sample_rate_hz, Some(44_100));
    }

    #[test]
    fn wav_with_id3v2_does_not_create_riff_info() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("tagged.wav");
        test_support::write_wav(&path);
        test_support::add_id3v2(&path, "Old");
        let source = MetadataSource::probe(&path);

        let (result, _) = source.export(&full());
        assert_eq!(result, ExportResult::Succeeded);

        let file: WavFile = read(&path);
        assert!(file.id3v2().is_some());
        assert!(file.riff_info().is_none());
        assert_eq!(reimport(&source).tags, full().tags);
    }

    #[test]
    fn wav_with_both_writes_both() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("both.wav");
        test_support::write_wav(&path);
        let source = MetadataSource::probe(&path);
        assert_eq!(source.export(&titled("First")).0, ExportResult::Succeeded);
        test_support::add_id3v2(&path, "Old");

        let (result, _) = source.export(&titled("Second"));
        assert_eq!(result, ExportResult::Succeeded);

        let file: WavFile = read(&path);
        let id3v2: Tag = file.id3v2().cloned().unwrap().into();
        let riff: Tag = file.riff_info().cloned().unwrap().into();
        assert_eq!(id3v2.title().as_deref(), Some("Second"));
        assert_eq!(riff.title().as_deref(), Some("Second"));
    }

    #[test]
    fn flac_roundtrip_through_comment_block() {
        test_support::init_tracing();
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("song.flac");
        test_support::write_flac(&path, &[("TITLE", "Old")], Some(b"png".as_slice()));
        let source = MetadataSource::probe(&path);

        let (result, _) = source.export(&full());
        assert_eq!(result, ExportResult::Succeeded);

        let back = reimport(&source);
        assert_eq!(back.tags, full().tags);
        assert_eq!(back.cover.map(|c| c.data), Some(b"png".to_vec()));
        assert_eq!(read::<FlacFile>(&path).pictures().len(), 1);
    }

    #[test]
    fn flac_without_comments_gets_a_new_block() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("bare.flac");
        test_support::write_flac(&path, &[], None);
        let source = MetadataSource::probe(&path);

        let (result, _) = source.export(&titled("Created"));
        assert_eq!(result, ExportResult::Succeeded);
        assert!(read::<FlacFile>(&path).vorbis_comments().is_some());
        assert_eq!(reimport(&source).tags.title.as_deref(), Some("Created"));
    }

    #[test]
    fn flac_id3v2_moves_into_comment_block() {
        test_support::init_tracing();
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("id3.flac");
        test_support::write_flac(&path, &[], None);
        test_support::prepend_id3v2(&path, "Old Artist");
        let source = MetadataSource::probe(&path);
        assert_eq!(source.format(), FileFormat::Flac);

        let mut track = TrackMetadata::default();
        track.tags.artist = Some("New Artist".into());
        let (result, _) = source.export(&track);
        assert_eq!(result, ExportResult::Succeeded);

        assert!(fs::read(&path).unwrap().starts_with(b"fLaC"));
        let file: FlacFile = read(&path);
        assert!(file.id3v2().is_none());
        assert!(file.vorbis_comments().is_some());
        assert_eq!(reimport(&source).tags.artist.as_deref(), Some("New Artist"));
    }

    #[test]
    fn opus_roundtrip_through_comments() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("song.opus");
        test_support::write_opus(&path, &[("TITLE", "Old")]);
        let source = MetadataSource::probe(&path);
        assert_eq!(source.format(), FileFormat::Opus);

        let (result, _) = source.export(&full());
        assert_eq!(result, ExportResult::Succeeded);
        assert_eq!(reimport(&source).tags, full().tags);
    }

    #[test]
    fn aiff_roundtrip_through_new_id3v2() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("song.aiff");
        test_support::write_aiff(&path);
        let source = MetadataSource::probe(&path);
        assert_eq!(source.format(), FileFormat::Aiff);

        let (result, _) = source.export(&full());
        assert_eq!(result, ExportResult::Succeeded);

        let back = reimport(&source);
        assert_eq!(back.tags, full().tags);
        assert_eq!(back.audio.sample_rate_hz, Some(44_100));
    }

    #[test]
    fn nothing_to_write_fails_and_keeps_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("song.mp3");
        test_support::write_mp3(&path);
        let before = fs::read(&path).unwrap();

        let (result, _) = MetadataSource::probe(&path).export(&TrackMetadata::default());
        assert_eq!(result, ExportResult::Failed);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn unsupported_format_is_untouched() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("notes.txt");
        fs::write(&path, b"plain text").unwrap();

        let (result, _) = MetadataSource::probe(&path).export(&titled("x"));
        assert_eq!(result, ExportResult::Unsupported);
        assert_eq!(fs::read(&path).unwrap(), b"plain text");
    }

    #[test]
    fn unparseable_file_fails_and_keeps_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("broken.mp3");
        fs::write(&path, b"this is no mpeg stream").unwrap();

        let (result, _) = MetadataSource::new(&path, FileFormat::Mp3).export(&titled("x"));
        assert_eq!(result, ExportResult::Failed);
        assert_eq!(fs::read(&path).unwrap(), b"this is no mpeg stream");
    }

    #[test]
    fn failed_commit_keeps_original_bytes() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("song.mp3");
        test_support::write_mp3(&path);
        let before = fs::read(&path).unwrap();

        let source = MetadataSource::probe(&path).with_replacer(Arc::new(FailingReplace));
        let (result, _) = source.export(&titled("Never written"));

        assert_eq!(result, ExportResult::Failed);
        assert_eq!(fs::read(&path).unwrap(), before);
        let leftovers = fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[cfg(unix)]
    #[test]
    fn read_only_target_fails_before_copy() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let path = tmp.path().join("song.mp3");
        test_support::write_mp3(&path);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();
        let before = fs::read(&path).unwrap();

        let (result, _) = MetadataSource::probe(&path).export(&titled("x"));
        assert_eq!(result, ExportResult::Failed);
        assert_eq!(fs::read(&path).unwrap(), before);
    }
}
