//! Tag list extraction and sanitization.

use crate::record::CellValue;

/// Tags longer than this (in characters) are misparsed text, not tags.
pub const MAX_TAG_LENGTH: usize = 100;

/// Tag column as seen at the normalizer boundary.
///
/// Any container is adapted into `Sequence`; nulls and scalars become `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum TagList {
    Sequence(Vec<CellValue>),
    Empty,
}

impl TagList {
    /// Adapt a raw cell into a tag list.
    pub fn from_cell(value: Option<&CellValue>) -> Self {
        match value {
            Some(CellValue::List(items)) => TagList::Sequence(items.clone()),
            _ => TagList::Empty,
        }
    }

    /// Clean the list: string entries only, trimmed, non-empty and at most
    /// `MAX_TAG_LENGTH` characters. Order is preserved.
    pub fn sanitize(&self) -> Vec<String> {
        match self {
            TagList::Empty => Vec::new(),
            TagList::Sequence(items) => items
                .iter()
                .filter_map(|item| match item {
                    CellValue::Str(s) => Some(s.trim()),
                    _ => None,
                })
                .filter(|tag| !tag.is_empty() && tag.chars().count() <= MAX_TAG_LENGTH)
                .map(str::to_string)
                .collect(),
        }
    }
}
