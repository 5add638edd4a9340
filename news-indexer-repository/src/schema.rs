//! Collection schema for the news search collection.
//!
//! This module defines the field list of the `news` collection and the wire
//! shape sent to the search engine when the collection is created.

use serde::{Deserialize, Serialize};

use crate::errors::SearchError;

/// Default name of the news collection.
pub const COLLECTION_NAME: &str = "news";

/// Field used to order results when no explicit sort is requested.
pub const DEFAULT_SORTING_FIELD: &str = "published_at";

/// Value type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "int64")]
    Int64,
    #[serde(rename = "int32")]
    Int32,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "string[]")]
    StringArray,
}

impl FieldType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Int64 | FieldType::Int32)
    }
}

/// A single field descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub facet: bool,
    #[serde(default)]
    pub optional: bool,
    /// Left to the engine default when unset (numeric fields sort by default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<bool>,
}

impl SchemaField {
    /// Create a required, non-faceted field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            facet: false,
            optional: false,
            sort: None,
            index: None,
        }
    }

    /// Mark the field as usable for faceting.
    pub fn facet(mut self) -> Self {
        self.facet = true;
        self
    }

    /// Mark the field as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Enable sorting on the field.
    pub fn sortable(mut self) -> Self {
        self.sort = Some(true);
        self
    }

    /// Explicitly request indexing of the field.
    pub fn indexed(mut self) -> Self {
        self.index = Some(true);
        self
    }

    /// Whether the engine can sort on this field.
    pub fn is_sortable(&self) -> bool {
        self.sort.unwrap_or(self.field_type.is_numeric())
    }
}

/// Immutable description of a collection.
///
/// Use [`CollectionSchema::with_name`] to target a differently-named
/// collection; `self` is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    pub fields: Vec<SchemaField>,
    pub default_sorting_field: String,
}

impl CollectionSchema {
    /// The schema of the `news` collection.
    ///
    /// The field list covers every field of `NewsDocument` except `id`,
    /// which the engine manages as the primary key.
    pub fn news() -> Self {
        let optional_string = |name: &str| SchemaField::new(name, FieldType::String).optional();
        let theme = |name: &str| {
            SchemaField::new(name, FieldType::String)
                .facet()
                .optional()
        };

        Self {
            name: COLLECTION_NAME.to_string(),
            fields: vec![
                SchemaField::new("unique_id", FieldType::String)
                    .facet()
                    .sortable(),
                SchemaField::new("agency", FieldType::String)
                    .facet()
                    .optional(),
                SchemaField::new(DEFAULT_SORTING_FIELD, FieldType::Int64),
                optional_string("title"),
                optional_string("url"),
                optional_string("image"),
                SchemaField::new("category", FieldType::String)
                    .facet()
                    .optional(),
                optional_string("content"),
                optional_string("summary"),
                optional_string("subtitle"),
                optional_string("editorial_lead"),
                SchemaField::new("extracted_at", FieldType::Int64).optional(),
                theme("theme_1_level_1_code"),
                theme("theme_1_level_1_label"),
                theme("theme_1_level_2_code"),
                theme("theme_1_level_2_label"),
                theme("theme_1_level_3_code"),
                theme("theme_1_level_3_label"),
                theme("most_specific_theme_code"),
                theme("most_specific_theme_label"),
                SchemaField::new("published_year", FieldType::Int32)
                    .facet()
                    .optional(),
                SchemaField::new("published_month", FieldType::Int32)
                    .facet()
                    .optional(),
                SchemaField::new("published_week", FieldType::Int32)
                    .facet()
                    .optional()
                    .indexed(),
                SchemaField::new("tags", FieldType::StringArray)
                    .facet()
                    .optional(),
            ],
            default_sorting_field: DEFAULT_SORTING_FIELD.to_string(),
        }
    }

    /// A copy of this schema targeting another collection name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Check the schema invariants: a non-empty name, unique field names and a
    /// default sorting field that exists, is required and is numeric.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.name.trim().is_empty() {
            return Err(SearchError::schema("collection name is empty"));
        }

        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|other| other.name == field.name) {
                return Err(SearchError::schema(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
        }

        let sort_field = self.field(&self.default_sorting_field).ok_or_else(|| {
            SearchError::schema(format!(
                "default sorting field '{}' is not declared",
                self.default_sorting_field
            ))
        })?;

        if sort_field.optional {
            return Err(SearchError::schema(format!(
                "default sorting field '{}' must not be optional",
                sort_field.name
            )));
        }

        if !sort_field.field_type.is_numeric() || !sort_field.is_sortable() {
            return Err(SearchError::schema(format!(
                "default sorting field '{}' must be a sortable numeric field",
                sort_field.name
            )));
        }

        Ok(())
    }
}

impl Default for CollectionSchema {
    fn default() -> Self {
        Self::news()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use news_indexer_shared::NewsDocument;
    use serde_json::json;

    #[test]
    fn test_news_schema_is_valid() {
        let schema = CollectionSchema::news();
        schema.validate().unwrap();

        assert_eq!(schema.name, COLLECTION_NAME);
        assert_eq!(schema.default_sorting_field, "published_at");
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(CollectionSchema::news()).unwrap();

        assert_eq!(value["name"], "news");
        assert_eq!(value["default_sorting_field"], "published_at");

        let fields = value["fields"].as_array().unwrap();
        let published_at = fields
            .iter()
            .find(|f| f["name"] == "published_at")
            .unwrap();
        assert_eq!(
            published_at,
            &json!({"name": "published_at", "type": "int64", "facet": false, "optional": false})
        );

        let tags = fields.iter().find(|f| f["name"] == "tags").unwrap();
        assert_eq!(tags["type"], "string[]");

        let week = fields
            .iter()
            .find(|f| f["name"] == "published_week")
            .unwrap();
        assert_eq!(week["index"], true);
        assert_eq!(week["type"], "int32");
    }

    #[test]
    fn test_with_name_leaves_source_untouched() {
        let schema = CollectionSchema::news();
        let renamed = schema.with_name("news_staging");

        assert_eq!(renamed.name, "news_staging");
        assert_eq!(schema.name, "news");
        assert_eq!(renamed.fields, schema.fields);
    }

    #[test]
    fn test_validate_rejects_optional_sort_field() {
        let mut schema = CollectionSchema::news();
        schema.fields[2] = SchemaField::new("published_at", FieldType::Int64).optional();

        assert!(matches!(
            schema.validate(),
            Err(SearchError::SchemaError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_string_sort_field() {
        let mut schema = CollectionSchema::news();
        schema.default_sorting_field = "title".to_string();
        assert!(schema.validate().is_err());

        schema.default_sorting_field = "missing".to_string();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut schema = CollectionSchema::news();
        schema.fields.push(SchemaField::new("title", FieldType::String));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_every_document_field_is_declared() {
        let mut doc = NewsDocument::new("id", 1);
        doc.extracted_at = Some(1);
        doc.published_year = Some(2024);
        doc.published_month = Some(1);
        doc.published_week = Some(202401);
        doc.tags = Some(vec!["t".to_string()]);
        for name in [
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
        ] {
            *doc.string_field_mut(name).unwrap() = Some("x".to_string());
        }

        let schema = CollectionSchema::news();
        let value = serde_json::to_value(&doc).unwrap();
        for key in value.as_object().unwrap().keys() {
            if key == "id" {
                continue;
            }
            assert!(schema.field(key).is_some(), "field '{}' not in schema", key);
        }
        // id plus every schema field
        assert_eq!(value.as_object().unwrap().len(), schema.fields.len() + 1);
    }
}
