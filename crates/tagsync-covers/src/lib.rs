//! Crate `tagsync_covers`: adivina qué imagen usar como portada de una pista.

mod concurrent;
mod cover_info;
mod default_cover;
mod error;
mod guesser;
mod scanner;

#[cfg(test)]
mod test_support;

pub use concurrent::{
    CoverGuessTask, disable_concurrent_guessing_of_track_cover_info_during_tests, guess_track_cover_info_concurrently,
};
pub use cover_info::{COVER_EXTENSIONS, CoverInfo, CoverLocation, DEFAULT_COVER_FILE_NAME, PreferredCoverType};
pub use default_cover::{default_cover_location, save_embedded_cover};
pub use error::CoverError;
pub use guesser::{CoverArtTarget, CoverInfoGuesser, select_cover_art_for_track};
pub use scanner::{FolderScanner, FsFolderScanner, find_possible_covers_in_folder};
