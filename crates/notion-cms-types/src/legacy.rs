//! Decoding of legacy page-chunk records.
//!
//! These records keep their content in a `properties` map of rich-text
//! sections and their styling in a `format` map:
//!
//! ```json
//! { "id": "…", "type": "callout",
//!   "properties": { "title": [["Heads up"]] },
//!   "format": { "block_color": "gray_background", "page_icon": "💡" } }
//! ```
//!
//! Only the record types the renderer knows how to draw are mapped onto
//! [`Block`] variants. Any other legacy record becomes
//! [`Block::Unrecognized`] with the whole record as its raw payload.

use serde_json::{Map, Value};

use crate::{Block, CalloutBlock, FileReference, Icon, ModelError, Opaque, RichTextBlock, RichTextRun};

/// Discriminants that only exist in the legacy format.
const LEGACY_ONLY: &[&str] = &[
    "header",
    "sub_header",
    "sub_sub_header",
    "text",
    "bulleted_list",
    "numbered_list",
];

/// Shared discriminants whose legacy records may omit both `properties` and
/// `format`. Without an API payload key they decode as legacy records.
const LEGACY_BARE: &[&str] = &["image", "callout"];

/// Called only when the API payload key named after `kind` is absent.
pub(crate) fn is_legacy_record(kind: &str, record: &Map<String, Value>) -> bool {
    LEGACY_ONLY.contains(&kind)
        || LEGACY_BARE.contains(&kind)
        || record.contains_key("properties")
        || record.contains_key("format")
}

pub(crate) fn decode(kind: &str, record: Map<String, Value>) -> Result<Block, ModelError> {
    let block = match kind {
        "header" => Block::Heading1(RichTextBlock::new(title(kind, &record)?)),
        "sub_header" => Block::Heading2(RichTextBlock::new(title(kind, &record)?)),
        "sub_sub_header" => Block::Heading3(RichTextBlock::new(title(kind, &record)?)),
        "text" => Block::Paragraph(RichTextBlock::new(title(kind, &record)?)),
        "bulleted_list" => Block::BulletedListItem(RichTextBlock::new(title(kind, &record)?)),
        "numbered_list" => Block::NumberedListItem(RichTextBlock::new(title(kind, &record)?)),
        "divider" => Block::Divider,
        "image" => Block::Image(image(kind, &record)?),
        "callout" => Block::Callout(CalloutBlock {
            text: title(kind, &record)?,
            icon: format_str(&record, "page_icon").map(icon),
            color: format_str(&record, "block_color").map(str::to_string),
        }),
        _ => Block::Unrecognized {
            tag: kind.to_string(),
            raw: Opaque(Value::Object(record)),
        },
    };
    Ok(block)
}

fn property<'a>(record: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    record.get("properties").and_then(|p| p.get(name))
}

fn sections(kind: &str, value: Option<&Value>) -> Result<Vec<RichTextRun>, ModelError> {
    match value {
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| ModelError::payload(kind, e)),
        None => Ok(Vec::new()),
    }
}

fn title(kind: &str, record: &Map<String, Value>) -> Result<Vec<RichTextRun>, ModelError> {
    sections(kind, property(record, "title"))
}

/// The image source is the first entry of the `source` property.
/// A missing source decodes to an empty URL; the renderer decides what to do with it.
fn image(kind: &str, record: &Map<String, Value>) -> Result<FileReference, ModelError> {
    let url = property(record, "source")
        .and_then(|s| s.get(0))
        .and_then(|entry| entry.get(0))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let mut file = FileReference::external(url);
    file.caption = sections(kind, property(record, "caption"))?;
    Ok(file)
}

fn format_str<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    record.get("format").and_then(|f| f.get(key)).and_then(Value::as_str)
}

fn icon(value: &str) -> Icon {
    if value.starts_with("http://") || value.starts_with("https://") {
        Icon::File(FileReference::external(value))
    } else {
        Icon::Emoji(value.to_string())
    }
}
