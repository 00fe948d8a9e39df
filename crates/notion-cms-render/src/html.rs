//! HTML serialization of [`Markup`] trees.
//!
//! Text and attribute values are escaped with `html-escape`. The writer walks
//! the tree with an explicit stack, like the renderer, so arbitrarily deep
//! trees serialize without growing the call stack.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::{CalloutIcon, HeadingLevel, Markup};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Put a newline between top-level blocks.
    pub newline_between_blocks: bool,
}

enum Step<'m> {
    Enter(&'m Markup),
    Close(&'static str),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlWriter {
    options: HtmlOptions,
}

impl HtmlWriter {
    pub fn new(options: HtmlOptions) -> Self {
        Self { options }
    }

    pub fn write(&self, blocks: &[Markup]) -> String {
        let mut out = String::new();
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 && self.options.newline_between_blocks {
                out.push('\n');
            }
            write_markup(block, &mut out);
        }
        out
    }
}

/// Serializes with default options.
pub fn to_html(blocks: &[Markup]) -> String {
    HtmlWriter::default().write(blocks)
}

fn write_markup(root: &Markup, out: &mut String) {
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        let markup = match step {
            Step::Close(close) => {
                out.push_str(close);
                continue;
            }
            Step::Enter(markup) => markup,
        };

        match markup {
            Markup::Text(text) => out.push_str(&encode_text(text)),
            Markup::Fragment(children) => push_children(&mut stack, children),
            Markup::LineBreak => out.push_str("<br>"),
            Markup::Strong(child) => open(&mut stack, out, "<strong>", "</strong>", child),
            Markup::Emphasis(child) => open(&mut stack, out, "<em>", "</em>", child),
            Markup::Strike(child) => open(&mut stack, out, "<s>", "</s>", child),
            Markup::Code(child) => open(&mut stack, out, "<code>", "</code>", child),
            Markup::InlineCode(code) => {
                out.push_str("<code>");
                out.push_str(&encode_text(code));
                out.push_str("</code>");
            }
            Markup::Anchor { href, child } => {
                out.push_str("<a");
                push_attr(out, "href", href);
                out.push('>');
                stack.push(Step::Close("</a>"));
                stack.push(Step::Enter(&**child));
            }
            Markup::PageLink { href, children, .. } => {
                out.push_str("<a class=\"page-link\"");
                push_attr(out, "href", href);
                out.push('>');
                stack.push(Step::Close("</a>"));
                push_children(&mut stack, children);
            }
            Markup::Heading { level, children } => {
                let (start, close) = match level {
                    HeadingLevel::H1 => ("<h1>", "</h1>"),
                    HeadingLevel::H2 => ("<h2>", "</h2>"),
                    HeadingLevel::H3 => ("<h3>", "</h3>"),
                };
                out.push_str(start);
                stack.push(Step::Close(close));
                push_children(&mut stack, children);
            }
            Markup::Paragraph(children) => {
                out.push_str("<p>");
                stack.push(Step::Close("</p>"));
                push_children(&mut stack, children);
            }
            Markup::Image { src, alt } => {
                out.push_str("<img");
                push_attr(out, "src", src);
                if let Some(alt) = alt {
                    push_attr(out, "alt", alt);
                }
                out.push('>');
            }
            Markup::ListItem { key, children } => {
                out.push_str("<li");
                push_attr(out, "data-block-id", &key.hyphenated().to_string());
                out.push('>');
                stack.push(Step::Close("</li>"));
                push_children(&mut stack, children);
            }
            Markup::Separator => out.push_str("<hr>"),
            Markup::Callout {
                color,
                icon,
                children,
            } => {
                let class = match color {
                    Some(color) => format!("callout callout-{color}"),
                    None => "callout".to_string(),
                };
                out.push_str("<div");
                push_attr(out, "class", &class);
                out.push('>');
                match icon {
                    Some(CalloutIcon::Emoji(emoji)) => {
                        out.push_str("<span class=\"callout-icon\">");
                        out.push_str(&encode_text(emoji));
                        out.push_str("</span>");
                    }
                    Some(CalloutIcon::Image(src)) => {
                        out.push_str("<img class=\"callout-icon\"");
                        push_attr(out, "src", src);
                        out.push('>');
                    }
                    None => {}
                }
                out.push_str("<div class=\"callout-content\">");
                stack.push(Step::Close("</div></div>"));
                push_children(&mut stack, children);
            }
            Markup::Children(children) => {
                out.push_str("<div class=\"block-children\">");
                stack.push(Step::Close("</div>"));
                push_children(&mut stack, children);
            }
        }
    }
}

fn open<'m>(
    stack: &mut Vec<Step<'m>>,
    out: &mut String,
    start: &str,
    close: &'static str,
    child: &'m Markup,
) {
    out.push_str(start);
    stack.push(Step::Close(close));
    stack.push(Step::Enter(child));
}

/// Pushed in reverse so they pop in document order.
fn push_children<'m>(stack: &mut Vec<Step<'m>>, children: &'m [Markup]) {
    stack.extend(children.iter().rev().map(Step::Enter));
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&encode_double_quoted_attribute(value));
    out.push('"');
}
