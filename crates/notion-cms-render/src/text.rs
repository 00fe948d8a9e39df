use notion_cms_types::{Modifier, RichTextRun};

use crate::{Diagnostic, Markup, Renderer};

/// Placeholder shown in place of a mentioned page's title.
pub const PAGE_MENTION_LABEL: &str = "Page ";

impl Renderer<'_> {
    /// Composes rich text into one markup fragment per run, in run order.
    ///
    /// `None` and an empty slice both produce no fragments.
    pub fn compose(&self, runs: Option<&[RichTextRun]>) -> Vec<Markup> {
        runs.unwrap_or_default()
            .iter()
            .map(|run| self.compose_run(run))
            .collect()
    }

    fn compose_run(&self, run: &RichTextRun) -> Markup {
        run.modifiers
            .iter()
            .fold(split_lines(&run.text), |content, modifier| {
                self.apply_modifier(content, modifier)
            })
    }

    /// Wraps `content` in the primitive for `modifier`.
    fn apply_modifier(&self, content: Markup, modifier: &Modifier) -> Markup {
        match modifier {
            Modifier::Bold => Markup::strong(content),
            Modifier::Italic => Markup::emphasis(content),
            Modifier::Strikethrough => Markup::strike(content),
            Modifier::Code => Markup::code(content),
            Modifier::Link { target } => Markup::anchor(target.clone(), content),
            // Replaces the run's own text.
            Modifier::PageMention { page_id } => Markup::PageLink {
                page_id: *page_id,
                href: self.links.page_href(page_id),
                children: vec![
                    Markup::text(PAGE_MENTION_LABEL),
                    Markup::InlineCode(page_id.to_string()),
                ],
            },
            Modifier::Unknown { tag, payload } => {
                self.emit(Diagnostic::unknown_modifier(tag, payload.as_value().to_string()));
                content
            }
        }
    }
}

/// `N` segments become `segment, break, segment, ...` with `N - 1` breaks.
/// A single segment is returned bare.
fn split_lines(text: &str) -> Markup {
    let mut parts = Vec::new();
    for (i, segment) in text.split('\n').enumerate() {
        if i > 0 {
            parts.push(Markup::LineBreak);
        }
        parts.push(Markup::text(segment));
    }

    match <[Markup; 1]>::try_from(parts) {
        Ok([only]) => only,
        Err(parts) => Markup::Fragment(parts),
    }
}
