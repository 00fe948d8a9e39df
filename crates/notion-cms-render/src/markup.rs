use notion_cms_types::{FileReference, Icon};
use uuid::Uuid;

/// Heading levels the block model can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalloutIcon {
    Emoji(String),
    Image(String),
}

impl From<&Icon> for CalloutIcon {
    fn from(icon: &Icon) -> Self {
        match icon {
            Icon::Emoji(emoji) => CalloutIcon::Emoji(emoji.clone()),
            Icon::File(file) => CalloutIcon::Image(file.url().to_string()),
        }
    }
}

/// Output tree of the renderer.
///
/// Each variant is one primitive of the target surface. The tree says which
/// primitive and which arguments; how a primitive looks is up to whoever
/// consumes it (see [`crate::html`] for the bundled HTML serializer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Text(String),
    /// Siblings with no wrapper of their own.
    Fragment(Vec<Markup>),
    LineBreak,
    Strong(Box<Markup>),
    Emphasis(Box<Markup>),
    Strike(Box<Markup>),
    /// Inline code wrapped around composed content.
    Code(Box<Markup>),
    /// Inline code holding literal text.
    InlineCode(String),
    Anchor {
        href: String,
        child: Box<Markup>,
    },
    /// Link to another page of the workspace.
    PageLink {
        page_id: Uuid,
        href: String,
        children: Vec<Markup>,
    },
    Heading {
        level: HeadingLevel,
        children: Vec<Markup>,
    },
    Paragraph(Vec<Markup>),
    Image {
        src: String,
        alt: Option<String>,
    },
    /// Keyed by the block id so list items stay stable across re-renders.
    ListItem {
        key: Uuid,
        children: Vec<Markup>,
    },
    Separator,
    Callout {
        color: Option<String>,
        icon: Option<CalloutIcon>,
        children: Vec<Markup>,
    },
    /// Rendered child blocks nested under their parent.
    Children(Vec<Markup>),
}

impl Markup {
    pub fn text(text: impl Into<String>) -> Self {
        Markup::Text(text.into())
    }

    pub fn strong(child: Markup) -> Self {
        Markup::Strong(Box::new(child))
    }

    pub fn emphasis(child: Markup) -> Self {
        Markup::Emphasis(Box::new(child))
    }

    pub fn strike(child: Markup) -> Self {
        Markup::Strike(Box::new(child))
    }

    pub fn code(child: Markup) -> Self {
        Markup::Code(Box::new(child))
    }

    pub fn anchor(href: impl Into<String>, child: Markup) -> Self {
        Markup::Anchor {
            href: href.into(),
            child: Box::new(child),
        }
    }

    pub fn image(file: &FileReference) -> Self {
        Markup::Image {
            src: file.url().to_string(),
            alt: file.name.clone(),
        }
    }

    /// The content list that nested child blocks are appended to, for
    /// primitives that hold their children inside themselves.
    pub(crate) fn nested_content_mut(&mut self) -> Option<&mut Vec<Markup>> {
        match self {
            Markup::ListItem { children, .. } | Markup::Callout { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Moves direct descendants into `out`, leaving `self` childless.
    fn detach_children(&mut self, out: &mut Vec<Markup>) {
        match self {
            Markup::Strong(child)
            | Markup::Emphasis(child)
            | Markup::Strike(child)
            | Markup::Code(child)
            | Markup::Anchor { child, .. } => {
                if !child.is_leaf() {
                    out.push(std::mem::replace(&mut **child, Markup::LineBreak));
                }
            }
            Markup::Fragment(children)
            | Markup::PageLink { children, .. }
            | Markup::Heading { children, .. }
            | Markup::Paragraph(children)
            | Markup::ListItem { children, .. }
            | Markup::Callout { children, .. }
            | Markup::Children(children) => out.append(children),
            Markup::Text(_)
            | Markup::LineBreak
            | Markup::InlineCode(_)
            | Markup::Image { .. }
            | Markup::Separator => {}
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(
            self,
            Markup::Text(_)
                | Markup::LineBreak
                | Markup::InlineCode(_)
                | Markup::Image { .. }
                | Markup::Separator
        )
    }
}

/// Tears the tree down with a heap worklist so dropping deep output cannot
/// overflow the call stack.
impl Drop for Markup {
    fn drop(&mut self) {
        if self.is_leaf() {
            return;
        }
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut markup) = pending.pop() {
            markup.detach_children(&mut pending);
        }
    }
}
