//! News document structure for the search collection.

use serde::{Deserialize, Serialize};

/// A news article as stored in the search collection.
///
/// `id` is the upsert key. Every `None` field is left out of the serialized
/// document, so an absent value never reaches the engine as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewsDocument {
    /// Primary key used for upsert.
    pub id: String,
    /// Dataset identifier, stored for display.
    pub unique_id: String,
    /// Unix timestamp in seconds. Default sorting field, 0 when unknown.
    pub published_at: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editorial_lead: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_1_level_1_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_1_level_1_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_1_level_2_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_1_level_2_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_1_level_3_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_1_level_3_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_specific_theme_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_specific_theme_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_month: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_week: Option<i32>,

    /// Never stored as an empty array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NewsDocument {
    /// Create a document with the required fields set and every optional
    /// field empty. `unique_id` mirrors `id`.
    pub fn new(id: impl Into<String>, published_at: i64) -> Self {
        let id = id.into();
        Self {
            unique_id: id.clone(),
            id,
            published_at,
            ..Default::default()
        }
    }

    /// Mutable slot for one of the optional string fields, by schema name.
    pub fn string_field_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        let slot = match name {
            "agency" => &mut self.agency,
            "title" => &mut self.title,
            "url" => &mut self.url,
            "image" => &mut self.image,
            "category" => &mut self.category,
            "content" => &mut self.content,
            "summary" => &mut self.summary,
            "subtitle" => &mut self.subtitle,
            "editorial_lead" => &mut self.editorial_lead,
            "theme_1_level_1_code" => &mut self.theme_1_level_1_code,
            "theme_1_level_1_label" => &mut self.theme_1_level_1_label,
            "theme_1_level_2_code" => &mut self.theme_1_level_2_code,
            "theme_1_level_2_label" => &mut self.theme_1_level_2_label,
            "theme_1_level_3_code" => &mut self.theme_1_level_3_code,
            "theme_1_level_3_label" => &mut self.theme_1_level_3_label,
            "most_specific_theme_code" => &mut self.most_specific_theme_code,
            "most_specific_theme_label" => &mut self.most_specific_theme_label,
            _ => return None,
        };
        Some(slot)
    }
}
