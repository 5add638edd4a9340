//! Document normalizer implementation.
//!
//! Transforms source records into `NewsDocument` structures for indexing.

use tracing::trace;

use crate::errors::NormalizeError;
use news_indexer_shared::{CellValue, NewsDocument, SourceRecord, TagList};

/// Prefix of ids synthesized for rows without a `unique_id`.
pub const SYNTHETIC_ID_PREFIX: &str = "doc_";

/// String fields copied from the source row when they hold a non-blank value.
pub const OPTIONAL_STRING_FIELDS: [&str; 17] = [
    "agency",
    "title",
    "url",
    "image",
    "category",
    "content",
    "summary",
    "subtitle",
    "editorial_lead",
    "theme_1_level_1_code",
    "theme_1_level_1_label",
    "theme_1_level_2_code",
    "theme_1_level_2_label",
    "theme_1_level_3_code",
    "theme_1_level_3_label",
    "most_specific_theme_code",
    "most_specific_theme_label",
];

const UNIQUE_ID_COLUMN: &str = "unique_id";
const PUBLISHED_AT_COLUMN: &str = "published_at_ts";
const EXTRACTED_AT_COLUMN: &str = "extracted_at_ts";
const PUBLISHED_YEAR_COLUMN: &str = "published_year";
const PUBLISHED_MONTH_COLUMN: &str = "published_month";
const PUBLISHED_WEEK_COLUMN: &str = "published_week";
const TAGS_COLUMN: &str = "tags";

/// Normalizer that turns one source row into a schema-conformant document.
///
/// The normalizer is responsible for:
/// - Deriving the document id (from `unique_id` or the row position)
/// - Defaulting the required `published_at` field
/// - Dropping blank optional fields instead of storing empty values
/// - Sanitizing the tag list
///
/// It performs no I/O. Rows with malformed values fail with a
/// `NormalizeError`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentNormalizer;

impl DocumentNormalizer {
    /// Create a new document normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalize a single source record.
    pub fn normalize(&self, record: &SourceRecord) -> Result<NewsDocument, NormalizeError> {
        let id = match trimmed_string(record, UNIQUE_ID_COLUMN)? {
            Some(unique_id) => unique_id,
            None => format!("{}{}", SYNTHETIC_ID_PREFIX, record.position),
        };

        let published_at = positive_integer(record, PUBLISHED_AT_COLUMN)?.unwrap_or(0);
        let mut doc = NewsDocument::new(id, published_at);

        for field in OPTIONAL_STRING_FIELDS {
            if let Some(value) = trimmed_string(record, field)? {
                if let Some(slot) = doc.string_field_mut(field) {
                    *slot = Some(value);
                }
            }
        }

        doc.extracted_at = positive_integer(record, EXTRACTED_AT_COLUMN)?;
        doc.published_year = positive_i32(record, PUBLISHED_YEAR_COLUMN)?;
        doc.published_month = positive_i32(record, PUBLISHED_MONTH_COLUMN)?;
        doc.published_week = positive_i32(record, PUBLISHED_WEEK_COLUMN)?;

        let tags = TagList::from_cell(record.present(TAGS_COLUMN)).sanitize();
        if !tags.is_empty() {
            doc.tags = Some(tags);
        }

        trace!(id = %doc.id, position = record.position, "Normalized record");
        Ok(doc)
    }
}

/// The column's string form, trimmed, or `None` when absent or blank.
fn trimmed_string(
    record: &SourceRecord,
    column: &'static str,
) -> Result<Option<String>, NormalizeError> {
    match record.present(column) {
        None => Ok(None),
        Some(value) if matches!(value, CellValue::List(_)) => Err(NormalizeError::InvalidType {
            position: record.position,
            column,
            expected: "scalar",
            found: value.type_name(),
        }),
        Some(value) => {
            let text = value.to_string();
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
    }
}

/// The column as an integer when present and strictly positive.
///
/// Positivity is checked on the raw value; floats are truncated afterwards.
fn positive_integer(
    record: &SourceRecord,
    column: &'static str,
) -> Result<Option<i64>, NormalizeError> {
    let value = match record.present(column) {
        None => return Ok(None),
        Some(value) => value,
    };

    match value {
        CellValue::Int(i) => Ok((*i > 0).then_some(*i)),
        CellValue::Float(f) => {
            if *f <= 0.0 {
                return Ok(None);
            }
            // Saturating casts would silently corrupt timestamps
            if !f.is_finite() || *f >= i64::MAX as f64 {
                return Err(NormalizeError::OutOfRange {
                    position: record.position,
                    column,
                    value: f.to_string(),
                });
            }
            Ok(Some(f.trunc() as i64))
        }
        other => Err(NormalizeError::InvalidType {
            position: record.position,
            column,
            expected: "number",
            found: other.type_name(),
        }),
    }
}

fn positive_i32(
    record: &SourceRecord,
    column: &'static str,
) -> Result<Option<i32>, NormalizeError> {
    positive_integer(record, column)?
        .map(|value| {
            i32::try_from(value).map_err(|_| NormalizeError::OutOfRange {
                position: record.position,
                column,
                value: value.to_string(),
            })
        })
        .transpose()
}
