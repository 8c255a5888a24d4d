//! Crate `tagsync_tags`: importa y exporta metadatos de pistas desde los tags
//! embebidos en ficheros de audio, eligiendo el tag según el formato.

mod backend;
mod config;
mod error;
mod export;
mod format;
mod import;
mod mapping;
mod resolver;
mod source;
mod track;

#[cfg(test)]
mod test_support;

pub use config::{ParsingMode, TagSyncConfig, TagSyncConfigBuilder};
pub use error::{ConfigError, Error};
pub use format::FileFormat;
pub use resolver::{ExportRule, ModifiedTags, TagKind, export_rule, import_order};
pub use source::{ExportResult, ImportFlags, ImportResult, MetadataSource};
pub use track::{AudioInfo, CoverImage, TagInfo, TagInfoBuilder, TrackMetadata, TrackMetadataBuilder};
