//! # News Indexer Shared
//!
//! Data types shared by the news indexer crates: the tabular source record,
//! the typed search document, tag lists and indexing statistics.

pub mod document;
pub mod record;
pub mod stats;
pub mod tags;
pub mod time;

pub use document::NewsDocument;
pub use record::{CellValue, RecordError, SourceRecord};
pub use stats::{IndexMode, IndexingStats, ParseModeError};
pub use tags::{TagList, MAX_TAG_LENGTH};
pub use time::PublishedDate;
