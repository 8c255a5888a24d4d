//! Traducción entre el `Tag` genérico de lofty y `TagInfo`.

use std::borrow::Cow;

use lofty::tag::{Accessor, ItemKey, Tag};

use crate::track::TagInfo;

fn assign<T>(slot: &mut Option<T>, value: Option<T>, reset_missing: bool) {
    if value.is_some() || reset_missing {
        *slot = value;
    }
}

fn text(tag: &Tag, key: ItemKey) -> Option<String> {
    tag.get_string(&key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// El primer campo presente entre claves equivalentes.
fn text_any(tag: &Tag, keys: &[ItemKey]) -> Option<String> {
    keys.iter().find_map(|key| text(tag, key.clone()))
}

fn owned(value: Option<Cow<'_, str>>) -> Option<String> {
    value.map(Cow::into_owned).filter(|s| !s.trim().is_empty())
}

// TPUB se lee como `Label` en ID3v2; APE sólo conoce `Year`.
const PUBLISHER_KEYS: &[ItemKey] = &[ItemKey::Label, ItemKey::Publisher];
const YEAR_KEYS: &[ItemKey] = &[ItemKey::RecordingDate, ItemKey::Year];

/// Vuelca el tag en `info`. Con `reset_missing` los campos ausentes se borran.
pub(crate) fn import_tag_info(info: &mut TagInfo, tag: &Tag, reset_missing: bool) {
    assign(&mut info.title, owned(tag.title()), reset_missing);
    assign(&mut info.artist, owned(tag.artist()), reset_missing);
    assign(&mut info.album, owned(tag.album()), reset_missing);
    assign(&mut info.album_artist, text(tag, ItemKey::AlbumArtist), reset_missing);

    assign(&mut info.track_number, tag.track(), reset_missing);
    assign(&mut info.track_total, tag.track_total(), reset_missing);
    assign(&mut info.disc_number, tag.disk(), reset_missing);
    assign(&mut info.disc_total, tag.disk_total(), reset_missing);

    assign(&mut info.genre, owned(tag.genre()), reset_missing);
    assign(&mut info.composer, text(tag, ItemKey::Composer), reset_missing);
    assign(&mut info.grouping, text(tag, ItemKey::ContentGroup), reset_missing);
    assign(&mut info.comment, owned(tag.comment()), reset_missing);
    assign(&mut info.publisher, text_any(tag, PUBLISHER_KEYS), reset_missing);
    assign(&mut info.key, text(tag, ItemKey::InitialKey), reset_missing);
    assign(&mut info.year, text_any(tag, YEAR_KEYS), reset_missing);
}

/// Los chunks de texto de AIFF sólo traen título, artista y comentario.
pub(crate) fn import_text_chunks(info: &mut TagInfo, tag: &Tag) {
    assign(&mut info.title, owned(tag.title()), false);
    assign(&mut info.artist, owned(tag.artist()), false);
    assign(&mut info.comment, owned(tag.comment()), false);
}

fn put_text(tag: &mut Tag, key: ItemKey, value: Option<&str>) {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => {
            tag.insert_text(key, v.to_owned());
        }
        None => {
            tag.remove_key(&key);
        }
    }
}

/// Borra todas las claves equivalentes y escribe el valor en la primera que
/// admita el tipo de tag.
fn put_text_any(tag: &mut Tag, keys: &[ItemKey], value: Option<&str>) {
    for key in keys {
        tag.remove_key(key);
    }
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        for key in keys {
            if tag.insert_text(key.clone(), v.to_owned()) {
                break;
            }
        }
    }
}

/// Escribe todos los campos de `info` en el tag; los vacíos se eliminan.
pub(crate) fn export_tag_info(tag: &mut Tag, info: &TagInfo) {
    put_text(tag, ItemKey::TrackTitle, info.title.as_deref());
    put_text(tag, ItemKey::TrackArtist, info.artist.as_deref());
    put_text(tag, ItemKey::AlbumTitle, info.album.as_deref());
    put_text(tag, ItemKey::AlbumArtist, info.album_artist.as_deref());

    match info.track_number {
        Some(n) => tag.set_track(n),
        None => tag.remove_track(),
    }
    match info.track_total {
        Some(n) => tag.set_track_total(n),
        None => tag.remove_track_total(),
    }
    match info.disc_number {
        Some(n) => tag.set_disk(n),
        None => tag.remove_disk(),
    }
    match info.disc_total {
        Some(n) => tag.set_disk_total(n),
        None => tag.remove_disk_total(),
    }

    put_text(tag, ItemKey::Genre, info.genre.as_deref());
    put_text(tag, ItemKey::Composer, info.composer.as_deref());
    put_text(tag, ItemKey::ContentGroup, info.grouping.as_deref());
    put_text(tag, ItemKey::Comment, info.comment.as_deref());
    put_text_any(tag, PUBLISHER_KEYS, info.publisher.as_deref());
    put_text(tag, ItemKey::InitialKey, info.key.as_deref());
    put_text_any(tag, YEAR_KEYS, info.year.as_deref());
}
