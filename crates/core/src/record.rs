//! Catalog records as returned by the archive's item API.
//!
//! Only the handful of fields the resolver inspects are decoded; everything
//! else in the API payload is ignored. The public API is loose about whether
//! a field is a single string or a list of strings, so both shapes are
//! accepted for `online_format` and `image_url`.
//!
//! # Example
//!
//! ```rust
//! use loctext_core::Record;
//!
//! let json = r#"{"item": {"id": "http://www.loc.gov/item/abc/", "online_format": ["image"],
//!                "image_url": ["https://tile.loc.gov/image-services/iiif/abc:1/full/pct:100/0/default.jpg"]}}"#;
//! let record = Record::from_json(json).unwrap();
//! assert_eq!(record.image_url.len(), 1);
//! assert!(!record.is_audio());
//! ```

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{LoctextError, Result};

/// A single catalog record. Never mutated by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Record {
    /// Item identifier, usually the item URL.
    #[serde(default)]
    pub id: Option<String>,

    /// Free-form format tags such as `"image"` or `"audio"`.
    ///
    /// `None` means the key is absent and the item is not published online.
    #[serde(default, deserialize_with = "optional_string_or_list")]
    pub online_format: Option<Vec<String>>,

    /// Image URLs in record order.
    #[serde(default, deserialize_with = "string_or_list")]
    pub image_url: Vec<String>,

    /// Attached resources, some of which link a transcription file.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub resources: Vec<Resource>,
}

/// A resource attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Resource {
    /// Direct link to a machine-readable transcription, when one exists.
    #[serde(default)]
    pub fulltext_file: Option<String>,
}

impl Record {
    /// Decodes a record from JSON text, unwrapping an `{"item": ...}` envelope.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Decodes a record from a JSON value, unwrapping an `{"item": ...}` envelope.
    pub fn from_value(value: Value) -> Result<Self> {
        let item = match value {
            Value::Object(mut map) => match map.remove("item") {
                Some(item @ Value::Object(_)) => item,
                Some(_) => return Err(LoctextError::InvalidRecord("`item` is not an object".to_string())),
                None => Value::Object(map),
            },
            other => {
                return Err(LoctextError::InvalidRecord(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                )));
            }
        };

        serde_json::from_value(item).map_err(|e| LoctextError::InvalidRecord(e.to_string()))
    }

    /// Identifier for messages; falls back to a placeholder when the record has none.
    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("<record without id>")
    }

    /// Whether any format tag is `"audio"`.
    pub fn is_audio(&self) -> bool {
        self.online_format
            .as_ref()
            .is_some_and(|formats| formats.iter().any(|f| f == "audio"))
    }

    /// Transcription links from `resources`, in record order.
    pub fn fulltext_files(&self) -> impl Iterator<Item = &str> {
        self.resources
            .iter()
            .filter_map(|r| r.fulltext_file.as_deref())
            .filter(|f| !f.is_empty())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OneOrMany>::deserialize(deserializer)?
        .map(Vec::from)
        .unwrap_or_default())
}

fn optional_string_or_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(Vec::from))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
