use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{ModelError, RichTextRun};

/// A file attached to a block, page cover or icon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFile")]
pub struct FileReference {
    pub source: FileSource,
    /// Empty when the object carries no caption.
    pub caption: Vec<RichTextRun>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileSource {
    /// Uploaded to the workspace; the signed URL stops working at `expiry_time`.
    Hosted {
        url: String,
        expiry_time: Option<DateTime<Utc>>,
    },
    External {
        url: String,
    },
}

impl FileReference {
    pub fn external(url: impl Into<String>) -> Self {
        Self {
            source: FileSource::External { url: url.into() },
            caption: Vec::new(),
            name: None,
        }
    }

    pub fn url(&self) -> &str {
        match &self.source {
            FileSource::Hosted { url, .. } | FileSource::External { url } => url,
        }
    }
}

/// A page or callout icon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawIcon")]
pub enum Icon {
    Emoji(String),
    File(FileReference),
}

#[derive(Deserialize)]
struct RawFile {
    #[serde(rename = "type")]
    kind: Option<String>,
    file: Option<HostedBody>,
    external: Option<ExternalBody>,
    #[serde(default)]
    caption: Vec<RichTextRun>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct HostedBody {
    url: String,
    expiry_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ExternalBody {
    url: String,
}

impl TryFrom<RawFile> for FileReference {
    type Error = ModelError;

    fn try_from(raw: RawFile) -> Result<Self, Self::Error> {
        let hosted = |body: HostedBody| FileSource::Hosted {
            url: body.url,
            expiry_time: body.expiry_time,
        };
        let external = |body: ExternalBody| FileSource::External { url: body.url };

        // `type` is optional on older objects; fall back to whichever body is present.
        let source = match (raw.kind.as_deref(), raw.file, raw.external) {
            (Some("file"), Some(body), _) => hosted(body),
            (Some("external"), _, Some(body)) => external(body),
            (None, Some(body), _) => hosted(body),
            (None, None, Some(body)) => external(body),
            _ => return Err(ModelError::MissingFileSource),
        };

        Ok(Self {
            source,
            caption: raw.caption,
            name: raw.name,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIcon {
    Emoji { emoji: String },
    File(FileReference),
}

impl From<RawIcon> for Icon {
    fn from(raw: RawIcon) -> Self {
        match raw {
            RawIcon::Emoji { emoji } => Icon::Emoji(emoji),
            RawIcon::File(file) => Icon::File(file),
        }
    }
}
