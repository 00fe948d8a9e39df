use serde_json::Value;

/// Errors raised while decoding fetched JSON into the content model.
///
/// Unknown discriminants are never errors; they decode into an explicit
/// catch-all variant. These errors only cover shapes that claim a known
/// variant but do not carry its required fields.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("rich text section must start with a string, got {0}")]
    InvalidSection(Value),

    #[error("file object has neither a hosted nor an external source")]
    MissingFileSource,

    #[error("failed to decode {tag} payload: {source}")]
    Payload {
        tag: String,
        source: serde_json::Error,
    },

    #[error("unknown user type {0:?}")]
    UnknownUserType(String),
}

impl ModelError {
    pub(crate) fn payload(tag: &str, source: serde_json::Error) -> Self {
        Self::Payload {
            tag: tag.to_string(),
            source,
        }
    }
}
