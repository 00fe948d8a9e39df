use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{FileReference, Icon, ModelError, Opaque, RichTextRun};

/// A top-level page with its metadata and typed properties.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page {
    pub id: Uuid,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
    pub icon: Option<Icon>,
    pub cover: Option<FileReference>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    pub parent: Parent,
    pub url: String,
}

impl Page {
    /// The runs of the page's title property, whatever it is named.
    pub fn title(&self) -> &[RichTextRun] {
        self.properties
            .values()
            .find_map(|value| match value {
                PropertyValue::Title(runs) => Some(runs.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parent {
    DatabaseId { database_id: Uuid },
    PageId { page_id: Uuid },
    Workspace,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectOption {
    pub id: Option<String>,
    pub name: String,
    pub color: Option<String>,
}

/// A page property value, keyed by its `type`.
///
/// Property types the renderer has no use for are preserved as
/// [`PropertyValue::Other`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawProperty")]
pub enum PropertyValue {
    Title(Vec<RichTextRun>),
    RichText(Vec<RichTextRun>),
    Number(Option<f64>),
    Checkbox(bool),
    Url(Option<String>),
    Email(Option<String>),
    Select(Option<SelectOption>),
    MultiSelect(Vec<SelectOption>),
    Other { tag: String, raw: Opaque },
}

#[derive(Deserialize)]
struct RawProperty {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl TryFrom<RawProperty> for PropertyValue {
    type Error = ModelError;

    fn try_from(raw: RawProperty) -> Result<Self, Self::Error> {
        let RawProperty { kind, mut rest } = raw;
        let body = rest.remove(&kind).unwrap_or(Value::Null);

        fn field<T: serde::de::DeserializeOwned>(kind: &str, body: Value) -> Result<T, ModelError> {
            serde_json::from_value(body).map_err(|e| ModelError::payload(kind, e))
        }

        let value = match kind.as_str() {
            "title" => PropertyValue::Title(field(&kind, body)?),
            "rich_text" => PropertyValue::RichText(field(&kind, body)?),
            "number" => PropertyValue::Number(field(&kind, body)?),
            "checkbox" => PropertyValue::Checkbox(field(&kind, body)?),
            "url" => PropertyValue::Url(field(&kind, body)?),
            "email" => PropertyValue::Email(field(&kind, body)?),
            "select" => PropertyValue::Select(field(&kind, body)?),
            "multi_select" => PropertyValue::MultiSelect(field(&kind, body)?),
            _ => PropertyValue::Other {
                tag: kind.clone(),
                raw: Opaque(body),
            },
        };
        Ok(value)
    }
}
