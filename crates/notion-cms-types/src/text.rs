use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{ModelError, Opaque};

/// A contiguous span of text sharing one ordered list of modifiers.
///
/// Decodes from either wire shape:
///
/// ```
/// use notion_cms_types::{Modifier, RichTextRun};
///
/// let legacy: RichTextRun = serde_json::from_str(r#"["hi", [["b"], ["a", "https://x"]]]"#).unwrap();
/// assert_eq!(
///     legacy.modifiers,
///     vec![Modifier::Bold, Modifier::Link { target: "https://x".into() }]
/// );
///
/// let api: RichTextRun = serde_json::from_str(
///     r#"{"type": "text", "plain_text": "hi", "annotations": {"bold": true}}"#,
/// )
/// .unwrap();
/// assert_eq!(api.modifiers, vec![Modifier::Bold]);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawRun")]
pub struct RichTextRun {
    pub text: String,
    pub modifiers: Vec<Modifier>,
}

impl RichTextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifiers(text: impl Into<String>, modifiers: Vec<Modifier>) -> Self {
        Self {
            text: text.into(),
            modifiers,
        }
    }
}

/// A formatting instruction attached to a run.
///
/// The legacy short tags are the canonical names: `b`, `i`, `s`, `c`, `a`, `p`.
/// Anything else is kept as [`Modifier::Unknown`] with the full original
/// section entry as payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    Bold,
    Italic,
    Strikethrough,
    Code,
    Link { target: String },
    PageMention { page_id: Uuid },
    Unknown { tag: String, payload: Opaque },
}

impl Modifier {
    pub fn tag(&self) -> &str {
        match self {
            Modifier::Bold => "b",
            Modifier::Italic => "i",
            Modifier::Strikethrough => "s",
            Modifier::Code => "c",
            Modifier::Link { .. } => "a",
            Modifier::PageMention { .. } => "p",
            Modifier::Unknown { tag, .. } => tag,
        }
    }

    /// Builds a modifier from a legacy `[tag, args...]` entry.
    ///
    /// A known tag whose argument is missing or malformed (a link without a
    /// target, a page mention whose id is not a UUID) degrades to `Unknown`
    /// rather than failing the whole document.
    fn from_entry(entry: Vec<Value>) -> Self {
        let tag = entry
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let arg = entry.get(1).and_then(Value::as_str);

        let known = match (tag.as_str(), arg) {
            ("b", _) => Some(Modifier::Bold),
            ("i", _) => Some(Modifier::Italic),
            ("s", _) => Some(Modifier::Strikethrough),
            ("c", _) => Some(Modifier::Code),
            ("a", Some(target)) => Some(Modifier::Link {
                target: target.to_string(),
            }),
            ("p", Some(id)) => Uuid::parse_str(id)
                .ok()
                .map(|page_id| Modifier::PageMention { page_id }),
            _ => None,
        };

        match known {
            Some(modifier) => modifier,
            None => Modifier::Unknown {
                tag,
                payload: Opaque(Value::Array(entry)),
            },
        }
    }

    fn unknown(tag: &str, args: &[&str]) -> Self {
        let mut entry = vec![Value::from(tag)];
        entry.extend(args.iter().map(|a| Value::from(*a)));
        Modifier::Unknown {
            tag: tag.to_string(),
            payload: Opaque(Value::Array(entry)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRun {
    Section(Vec<Value>),
    Object(ApiRun),
}

#[derive(Deserialize)]
struct ApiRun {
    plain_text: Option<String>,
    text: Option<ApiText>,
    #[serde(default)]
    annotations: Annotations,
    href: Option<String>,
    mention: Option<ApiMention>,
}

#[derive(Deserialize)]
struct ApiText {
    content: String,
    link: Option<ApiLink>,
}

#[derive(Deserialize)]
struct ApiLink {
    url: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct Annotations {
    bold: bool,
    italic: bool,
    strikethrough: bool,
    underline: bool,
    code: bool,
    color: Option<String>,
}

#[derive(Deserialize)]
struct ApiMention {
    page: Option<ApiPageRef>,
}

#[derive(Deserialize)]
struct ApiPageRef {
    id: Uuid,
}

impl TryFrom<RawRun> for RichTextRun {
    type Error = ModelError;

    fn try_from(raw: RawRun) -> Result<Self, Self::Error> {
        match raw {
            RawRun::Section(parts) => from_section(parts),
            RawRun::Object(run) => Ok(from_api(run)),
        }
    }
}

/// `["text"]` or `["text", [["b"], ["a", "https://..."]]]`
fn from_section(parts: Vec<Value>) -> Result<RichTextRun, ModelError> {
    let mut parts = parts.into_iter();
    let text = match parts.next() {
        Some(Value::String(text)) => text,
        Some(other) => return Err(ModelError::InvalidSection(other)),
        None => return Err(ModelError::InvalidSection(Value::Array(Vec::new()))),
    };

    let modifiers = match parts.next() {
        Some(Value::Array(entries)) => entries
            .into_iter()
            .map(|entry| match entry {
                Value::Array(entry) => Modifier::from_entry(entry),
                other => Modifier::Unknown {
                    tag: String::new(),
                    payload: Opaque(other),
                },
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(RichTextRun { text, modifiers })
}

/// Annotations have no inherent order; they are applied bold, italic,
/// strikethrough, code, then the link or page mention as the outermost wrap.
fn from_api(run: ApiRun) -> RichTextRun {
    let ApiRun {
        plain_text,
        text,
        annotations,
        href,
        mention,
    } = run;

    let (content, text_link) = match text {
        Some(ApiText { content, link }) => (Some(content), link.map(|l| l.url)),
        None => (None, None),
    };

    let mut modifiers = Vec::new();
    if annotations.bold {
        modifiers.push(Modifier::Bold);
    }
    if annotations.italic {
        modifiers.push(Modifier::Italic);
    }
    if annotations.strikethrough {
        modifiers.push(Modifier::Strikethrough);
    }
    if annotations.code {
        modifiers.push(Modifier::Code);
    }
    if annotations.underline {
        modifiers.push(Modifier::unknown("_", &[]));
    }
    if let Some(color) = annotations.color.as_deref()
        && color != "default"
    {
        modifiers.push(Modifier::unknown("h", &[color]));
    }

    if let Some(page) = mention.and_then(|m| m.page) {
        modifiers.push(Modifier::PageMention { page_id: page.id });
    } else if let Some(target) = href.or(text_link) {
        modifiers.push(Modifier::Link { target });
    }

    RichTextRun {
        text: plain_text.or(content).unwrap_or_default(),
        modifiers,
    }
}
