//! # notion-cms-types
//!
//! The content data model consumed by the renderer: pages, block trees, rich
//! text runs and the smaller shapes they reference (files, icons, users,
//! parents, list envelopes).
//!
//! Everything here is an immutable value snapshot decoded once from fetched
//! JSON. Nothing in this crate performs I/O or validates API responses beyond
//! what is needed to pick the right variant.
//!
//! ## Wire formats
//!
//! Two JSON shapes are accepted:
//!
//! - **Public API** objects, where the payload lives under a key named after
//!   the discriminant (`{"type": "heading_1", "heading_1": {"rich_text": [...]}}`)
//!   and rich text is a list of annotated objects.
//! - **Legacy records** from the page-chunk export, where blocks carry
//!   `properties`/`format` maps (`{"type": "header", "properties": {"title": [...]}}`)
//!   and rich text is a list of `[text, [[tag, arg], ...]]` sections.
//!
//! Both decode into the same types, so the renderer never sees the difference.
//!
//! ## Modules
//!
//! - **`block`**: `Block` variants, their payloads and `BlockNode`
//! - **`text`**: `RichTextRun` and `Modifier`
//! - **`file`**: `FileReference` and `Icon`
//! - **`page`**: `Page`, `Parent` and typed property values
//! - **`user`**: `User`
//! - **`listing`**: the paginated `Listing` envelope

pub mod block;
pub mod error;
pub mod file;
mod legacy;
pub mod listing;
pub mod page;
pub mod text;
pub mod user;

pub use block::{
    BookmarkBlock, Block, BlockNode, CalloutBlock, CodeBlock, EquationBlock, LinkToPage,
    RichTextBlock, SyncedBlock, SyncedFrom, TitleBlock, ToDoBlock, UrlBlock,
};
pub use error::ModelError;
pub use file::{FileReference, FileSource, Icon};
pub use listing::Listing;
pub use page::{Page, Parent, PropertyValue, SelectOption};
pub use text::{Modifier, RichTextRun};
pub use user::User;

pub use uuid::Uuid;

/// A dynamic payload the model carries but never interprets.
///
/// Used for bot details, template/audio/unsupported bodies and everything
/// the decoder does not recognize. The value is kept exactly as received.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct Opaque(pub serde_json::Value);

impl Opaque {
    pub fn null() -> Self {
        Self(serde_json::Value::Null)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for Opaque {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
