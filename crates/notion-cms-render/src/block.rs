use notion_cms_types::{Block, BlockNode, FileReference};

use crate::{CalloutIcon, Diagnostic, HeadingLevel, Markup, Renderer};

/// A node whose own markup is built and whose children are still being walked.
struct Frame<'n> {
    node: &'n BlockNode,
    own: Option<Markup>,
    next_child: usize,
    children: Vec<Markup>,
}

impl Renderer<'_> {
    /// Renders each root in order, skipping roots that produce nothing.
    pub fn render_tree(&self, roots: &[BlockNode]) -> Vec<Markup> {
        roots.iter().filter_map(|root| self.render(root)).collect()
    }

    /// Renders one node and everything below it.
    ///
    /// Returns `None` when neither the node nor any of its descendants
    /// produce output. The walk is pre-order, so diagnostics come out in
    /// document order.
    pub fn render(&self, root: &BlockNode) -> Option<Markup> {
        let mut stack = vec![self.enter(root)];

        loop {
            let frame = stack.last_mut()?;
            let node = frame.node;
            if let Some(child) = node.children().get(frame.next_child) {
                frame.next_child += 1;
                let child_frame = self.enter(child);
                stack.push(child_frame);
                continue;
            }

            let done = stack.pop()?;
            let markup = attach_children(done.own, done.children);
            match stack.last_mut() {
                Some(parent) => parent.children.extend(markup),
                None => return markup,
            }
        }
    }

    fn enter<'n>(&self, node: &'n BlockNode) -> Frame<'n> {
        Frame {
            node,
            own: self.render_own(node),
            next_child: 0,
            children: Vec::new(),
        }
    }

    /// The node's own markup, without its children.
    fn render_own(&self, node: &BlockNode) -> Option<Markup> {
        match &node.block {
            Block::Heading1(b) => Some(self.heading(HeadingLevel::H1, b)),
            Block::Heading2(b) => Some(self.heading(HeadingLevel::H2, b)),
            Block::Heading3(b) => Some(self.heading(HeadingLevel::H3, b)),
            Block::Paragraph(b) => Some(Markup::Paragraph(self.compose(Some(b.text.as_slice())))),
            Block::Image(file) => self.image(node, file),
            Block::BulletedListItem(b) | Block::NumberedListItem(b) => Some(Markup::ListItem {
                key: node.id,
                children: self.compose(Some(b.text.as_slice())),
            }),
            Block::Divider => Some(Markup::Separator),
            Block::Callout(callout) => Some(Markup::Callout {
                color: callout.color.clone(),
                icon: callout.icon.as_ref().map(CalloutIcon::from),
                children: self.compose(Some(callout.text.as_slice())),
            }),
            other => {
                self.emit(Diagnostic::unknown_block(other.discriminant(), raw_payload(other)));
                None
            }
        }
    }

    fn heading(&self, level: HeadingLevel, block: &notion_cms_types::RichTextBlock) -> Markup {
        Markup::Heading {
            level,
            children: self.compose(Some(block.text.as_slice())),
        }
    }

    fn image(&self, node: &BlockNode, file: &FileReference) -> Option<Markup> {
        if file.url().is_empty() {
            self.emit(Diagnostic::missing_field(
                node.block.discriminant(),
                "source",
                format!("{:?}", node.block),
            ));
            return None;
        }
        Some(Markup::image(file))
    }
}

/// Verbatim JSON for payloads we only carry, a debug dump for typed ones.
fn raw_payload(block: &Block) -> String {
    match block {
        Block::Unrecognized { raw, .. }
        | Block::Unsupported(raw)
        | Block::Template(raw)
        | Block::Audio(raw) => raw.as_value().to_string(),
        typed => format!("{typed:?}"),
    }
}

/// List items and callouts hold their children; other blocks are followed by
/// them. A node that rendered nothing is replaced by its children.
fn attach_children(own: Option<Markup>, children: Vec<Markup>) -> Option<Markup> {
    if children.is_empty() {
        return own;
    }

    match own {
        Some(mut markup) => {
            if let Some(content) = markup.nested_content_mut() {
                content.push(Markup::Children(children));
                return Some(markup);
            }
            Some(Markup::Fragment(vec![markup, Markup::Children(children)]))
        }
        None => Some(Markup::Fragment(children)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BaseUrlResolver, CollectingSink, DiagnosticKind};
    use notion_cms_types::{
        CalloutBlock, Icon, Modifier, Opaque, RichTextBlock, RichTextRun, ToDoBlock, Uuid,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn text(s: &str) -> RichTextBlock {
        RichTextBlock::new(vec![RichTextRun::plain(s)])
    }

    fn paragraph(n: u128, s: &str) -> BlockNode {
        BlockNode::new(id(n), Block::Paragraph(text(s)))
    }

    fn unrecognized(n: u128, tag: &str) -> BlockNode {
        BlockNode::new(
            id(n),
            Block::Unrecognized {
                tag: tag.into(),
                raw: Opaque(json!({ "shape": tag })),
            },
        )
    }

    struct Fixture {
        sink: CollectingSink,
        links: BaseUrlResolver,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                sink: CollectingSink::new(),
                links: BaseUrlResolver::new("/pages"),
            }
        }

        fn renderer(&self) -> Renderer<'_> {
            Renderer::new(&self.sink, &self.links)
        }
    }

    #[rstest]
    #[case(Block::Heading1(text("T")), HeadingLevel::H1)]
    #[case(Block::Heading2(text("T")), HeadingLevel::H2)]
    #[case(Block::Heading3(text("T")), HeadingLevel::H3)]
    fn headings(#[case] block: Block, #[case] level: HeadingLevel) {
        let f = Fixture::new();
        let out = f.renderer().render(&BlockNode::new(id(1), block));
        assert_eq!(
            out,
            Some(Markup::Heading {
                level,
                children: vec![Markup::text("T")],
            })
        );
    }

    #[test]
    fn paragraph_wraps_composed_text() {
        let f = Fixture::new();
        let node = BlockNode::new(
            id(1),
            Block::Paragraph(RichTextBlock::new(vec![
                RichTextRun::with_modifiers("bold", vec![Modifier::Bold]),
                RichTextRun::plain(" plain"),
            ])),
        );
        assert_eq!(
            f.renderer().render(&node),
            Some(Markup::Paragraph(vec![
                Markup::strong(Markup::text("bold")),
                Markup::text(" plain"),
            ]))
        );
    }

    #[test]
    fn empty_paragraph_still_renders() {
        let f = Fixture::new();
        let node = BlockNode::new(id(1), Block::Paragraph(RichTextBlock::default()));
        assert_eq!(f.renderer().render(&node), Some(Markup::Paragraph(vec![])));
    }

    #[rstest]
    #[case(Block::BulletedListItem(text("item")))]
    #[case(Block::NumberedListItem(text("item")))]
    fn list_items_are_keyed_by_block_id(#[case] block: Block) {
        let f = Fixture::new();
        let out = f.renderer().render(&BlockNode::new(id(42), block));
        assert_eq!(
            out,
            Some(Markup::ListItem {
                key: id(42),
                children: vec![Markup::text("item")],
            })
        );
    }

    #[test]
    fn image_uses_file_url_and_name() {
        let f = Fixture::new();
        let mut file = notion_cms_types::FileReference::external("https://example.com/a.png");
        file.name = Some("a.png".into());

        let out = f.renderer().render(&BlockNode::new(id(1), Block::Image(file)));
        assert_eq!(
            out,
            Some(Markup::Image {
                src: "https://example.com/a.png".into(),
                alt: Some("a.png".into()),
            })
        );
    }

    #[test]
    fn image_without_source_renders_nothing() {
        let f = Fixture::new();
        let node = BlockNode::new(id(1), Block::Image(notion_cms_types::FileReference::external("")));

        assert_eq!(f.renderer().render(&node), None);
        let diagnostics = f.sink.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingField { field: "source" });
        assert_eq!(diagnostics[0].tag, "image");
    }

    #[test]
    fn divider_is_a_separator() {
        let f = Fixture::new();
        assert_eq!(
            f.renderer().render(&BlockNode::new(id(1), Block::Divider)),
            Some(Markup::Separator)
        );
        assert!(f.sink.is_empty());
    }

    #[test]
    fn callout_carries_color_and_icon() {
        let f = Fixture::new();
        let node = BlockNode::new(
            id(1),
            Block::Callout(CalloutBlock {
                text: vec![RichTextRun::plain("Note")],
                icon: Some(Icon::Emoji("💡".into())),
                color: Some("blue_background".into()),
            }),
        );
        assert_eq!(
            f.renderer().render(&node),
            Some(Markup::Callout {
                color: Some("blue_background".into()),
                icon: Some(CalloutIcon::Emoji("💡".into())),
                children: vec![Markup::text("Note")],
            })
        );
    }

    #[test]
    fn unrecognized_block_renders_nothing_with_one_diagnostic() {
        let f = Fixture::new();
        assert_eq!(f.renderer().render(&unrecognized(1, "table")), None);

        let diagnostics = f.sink.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnknownBlock);
        assert_eq!(diagnostics[0].tag, "table");
        assert_eq!(diagnostics[0].payload, r#"{"shape":"table"}"#);
    }

    #[rstest]
    #[case(Block::Quote(text("q")), "quote")]
    #[case(Block::ToDo(ToDoBlock::default()), "to_do")]
    #[case(Block::Toggle(text("t")), "toggle")]
    #[case(Block::TableOfContents, "table_of_contents")]
    #[case(Block::Unsupported(Opaque::null()), "unsupported")]
    fn blocks_outside_the_dispatch_table_are_dropped(#[case] block: Block, #[case] tag: &str) {
        let f = Fixture::new();
        assert_eq!(f.renderer().render(&BlockNode::new(id(1), block)), None);
        let tags: Vec<_> = f.sink.diagnostics().into_iter().map(|d| d.tag).collect();
        assert_eq!(tags, vec![tag.to_string()]);
    }

    #[test]
    fn empty_tree_renders_nothing_silently() {
        let f = Fixture::new();
        assert_eq!(f.renderer().render_tree(&[]), vec![]);
        assert!(f.sink.is_empty());
    }

    #[test]
    fn render_tree_preserves_root_order_and_skips_dropped_roots() {
        let f = Fixture::new();
        let roots = vec![
            paragraph(1, "one"),
            unrecognized(2, "table"),
            BlockNode::new(id(3), Block::Divider),
            paragraph(4, "two"),
        ];
        assert_eq!(
            f.renderer().render_tree(&roots),
            vec![
                Markup::Paragraph(vec![Markup::text("one")]),
                Markup::Separator,
                Markup::Paragraph(vec![Markup::text("two")]),
            ]
        );
        assert_eq!(f.sink.len(), 1);
    }

    #[test]
    fn list_item_holds_its_children() {
        let f = Fixture::new();
        let node = BlockNode::new(id(1), Block::BulletedListItem(text("parent")))
            .with_children(vec![BlockNode::new(id(2), Block::BulletedListItem(text("child")))]);

        assert_eq!(
            f.renderer().render(&node),
            Some(Markup::ListItem {
                key: id(1),
                children: vec![
                    Markup::text("parent"),
                    Markup::Children(vec![Markup::ListItem {
                        key: id(2),
                        children: vec![Markup::text("child")],
                    }]),
                ],
            })
        );
    }

    #[test]
    fn paragraph_is_followed_by_its_children() {
        let f = Fixture::new();
        let node = paragraph(1, "parent").with_children(vec![paragraph(2, "child")]);
        assert_eq!(
            f.renderer().render(&node),
            Some(Markup::Fragment(vec![
                Markup::Paragraph(vec![Markup::text("parent")]),
                Markup::Children(vec![Markup::Paragraph(vec![Markup::text("child")])]),
            ]))
        );
    }

    #[test]
    fn children_of_unrecognized_blocks_are_hoisted() {
        let f = Fixture::new();
        let node = unrecognized(1, "toggle").with_children(vec![
            paragraph(2, "a"),
            unrecognized(3, "table"),
            paragraph(4, "b"),
        ]);

        assert_eq!(
            f.renderer().render(&node),
            Some(Markup::Fragment(vec![
                Markup::Paragraph(vec![Markup::text("a")]),
                Markup::Paragraph(vec![Markup::text("b")]),
            ]))
        );
        let tags: Vec<_> = f.sink.diagnostics().into_iter().map(|d| d.tag).collect();
        assert_eq!(tags, vec!["toggle", "table"]);
    }

    #[test]
    fn every_reachable_node_is_visited_once() {
        let f = Fixture::new();
        let node = unrecognized(1, "a").with_children(vec![
            unrecognized(2, "b").with_children(vec![unrecognized(3, "c")]),
            unrecognized(4, "d"),
        ]);

        assert_eq!(f.renderer().render(&node), None);
        let tags: Vec<_> = f.sink.diagnostics().into_iter().map(|d| d.tag).collect();
        assert_eq!(tags, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn rendering_is_repeatable_and_leaves_input_untouched() {
        let f = Fixture::new();
        let node = BlockNode::new(id(1), Block::Callout(CalloutBlock::default()))
            .with_children(vec![paragraph(2, "x\ny")]);
        let before = node.clone();

        let first = f.renderer().render(&node);
        let second = f.renderer().render(&node);

        assert_eq!(first, second);
        assert_eq!(node, before);
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let f = Fixture::new();
        let depth = 50_000;
        let mut node = paragraph(depth, "leaf");
        for n in (0..depth).rev() {
            node = BlockNode::new(id(n), Block::BulletedListItem(text("level")))
                .with_children(vec![node]);
        }

        let out = f.renderer().render(&node);
        assert!(matches!(out, Some(Markup::ListItem { .. })));
        assert!(f.sink.is_empty());

        let html = crate::html::to_html(out.as_slice());
        assert_eq!(html.matches("</li>").count(), depth as usize);

        drop(out);
        drop(node);
    }

    #[test]
    fn deep_unrecognized_chain_hoists_to_the_leaf() {
        let f = Fixture::new();
        let depth = 50_000;
        let mut node = paragraph(depth, "leaf");
        for n in (0..depth).rev() {
            node = unrecognized(n, "toggle").with_children(vec![node]);
        }

        let out = f.renderer().render(&node);
        assert_eq!(f.sink.len(), depth as usize);
        drop(node);
        drop(out);
    }
}
