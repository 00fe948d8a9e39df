//! # notion-cms-render
//!
//! Turns a block tree from [`notion_cms_types`] into a [`Markup`] tree.
//!
//! ## Pipeline
//!
//! ```text
//! BlockNode ─┬─ dispatch on block type ──► Markup::Heading / Paragraph / ListItem / …
//!            │
//!            └─ rich text runs ─► split lines ─► fold modifiers ─► inline Markup
//! ```
//!
//! - **Text composition** ([`Renderer::compose`]): every rich text run becomes
//!   one fragment. Embedded newlines become line breaks, then the run's
//!   modifiers are folded left over the result, so the first modifier ends up
//!   innermost.
//! - **Block rendering** ([`Renderer::render`], [`Renderer::render_tree`]):
//!   each block is dispatched on its discriminant. Blocks this crate does not
//!   draw render nothing and emit a diagnostic; their children are still
//!   rendered in their place. The walk uses an explicit stack, so nesting depth
//!   is bounded by memory, not by the call stack.
//!
//! ## Usage
//!
//! ```
//! use notion_cms_render::{BaseUrlResolver, CollectingSink, Renderer, html};
//! use notion_cms_types::BlockNode;
//!
//! let block: BlockNode = serde_json::from_str(r#"{
//!     "id": "00000000-0000-4000-8000-000000000001",
//!     "type": "header",
//!     "properties": { "title": [["Hello ", [["b"]]], ["world"]] }
//! }"#).unwrap();
//!
//! let sink = CollectingSink::new();
//! let links = BaseUrlResolver::new("https://example.com");
//! let renderer = Renderer::new(&sink, &links);
//!
//! let markup = renderer.render_tree(std::slice::from_ref(&block));
//! assert_eq!(html::to_html(&markup), "<h1><strong>Hello </strong>world</h1>");
//! assert!(sink.is_empty());
//! ```
//!
//! Rendering reads its input only and holds no mutable state of its own, so
//! one `Renderer` can be shared by threads rendering different trees.

pub mod block;
pub mod diagnostics;
pub mod html;
pub mod links;
pub mod markup;
pub mod text;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, LogSink, NullSink};
pub use links::{BaseUrlResolver, IdFormat, PageLinkResolver};
pub use markup::{CalloutIcon, HeadingLevel, Markup};

/// Renders rich text and block trees.
///
/// Holds the two collaborators rendering needs: where diagnostics go and how
/// page mentions become links.
#[derive(Clone, Copy)]
pub struct Renderer<'a> {
    sink: &'a dyn DiagnosticSink,
    links: &'a dyn PageLinkResolver,
}

impl<'a> Renderer<'a> {
    pub fn new(sink: &'a dyn DiagnosticSink, links: &'a dyn PageLinkResolver) -> Self {
        Self { sink, links }
    }

    pub(crate) fn emit(&self, diagnostic: Diagnostic) {
        self.sink.emit(diagnostic);
    }
}

impl std::fmt::Debug for Renderer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}
