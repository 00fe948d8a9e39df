use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{FileReference, Icon, ModelError, Opaque, RichTextRun, legacy};

/// Shared payload of every block whose body is just rich text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RichTextBlock {
    #[serde(default, alias = "rich_text")]
    pub text: Vec<RichTextRun>,
}

impl RichTextBlock {
    pub fn new(text: Vec<RichTextRun>) -> Self {
        Self { text }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CalloutBlock {
    #[serde(default, alias = "rich_text")]
    pub text: Vec<RichTextRun>,
    pub icon: Option<Icon>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToDoBlock {
    #[serde(default, alias = "rich_text")]
    pub text: Vec<RichTextRun>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CodeBlock {
    #[serde(default, alias = "rich_text")]
    pub text: Vec<RichTextRun>,
    pub language: Option<String>,
}

/// `child_page` and `child_database`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TitleBlock {
    pub title: String,
}

/// `embed` and `link_preview`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UrlBlock {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookmarkBlock {
    pub url: String,
    #[serde(default)]
    pub caption: Vec<RichTextRun>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EquationBlock {
    pub expression: String,
}

/// `synced_from` is absent (or null) on the original block of a sync group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SyncedBlock {
    pub synced_from: Option<SyncedFrom>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyncedFrom {
    pub block_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkToPage {
    PageId { page_id: Uuid },
    DatabaseId { database_id: Uuid },
}

/// One typed block. The payload always matches the discriminant.
///
/// [`Block::Unrecognized`] holds any discriminant this crate does not know,
/// so decoding never fails on block types added to the API later.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(RichTextBlock),
    Heading1(RichTextBlock),
    Heading2(RichTextBlock),
    Heading3(RichTextBlock),
    Callout(CalloutBlock),
    Quote(RichTextBlock),
    BulletedListItem(RichTextBlock),
    NumberedListItem(RichTextBlock),
    ToDo(ToDoBlock),
    Toggle(RichTextBlock),
    Code(CodeBlock),
    ChildPage(TitleBlock),
    ChildDatabase(TitleBlock),
    Embed(UrlBlock),
    Image(FileReference),
    Video(FileReference),
    File(FileReference),
    Pdf(FileReference),
    Bookmark(BookmarkBlock),
    Equation(EquationBlock),
    Divider,
    TableOfContents,
    Breadcrumb,
    ColumnList,
    Column,
    Template(Opaque),
    SyncedBlock(SyncedBlock),
    LinkToPage(LinkToPage),
    Audio(Opaque),
    LinkPreview(UrlBlock),
    Unsupported(Opaque),
    Unrecognized { tag: String, raw: Opaque },
}

impl Block {
    /// The API discriminant of this block (`"heading_1"`, `"divider"`, ...).
    pub fn discriminant(&self) -> &str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Heading1(_) => "heading_1",
            Block::Heading2(_) => "heading_2",
            Block::Heading3(_) => "heading_3",
            Block::Callout(_) => "callout",
            Block::Quote(_) => "quote",
            Block::BulletedListItem(_) => "bulleted_list_item",
            Block::NumberedListItem(_) => "numbered_list_item",
            Block::ToDo(_) => "to_do",
            Block::Toggle(_) => "toggle",
            Block::Code(_) => "code",
            Block::ChildPage(_) => "child_page",
            Block::ChildDatabase(_) => "child_database",
            Block::Embed(_) => "embed",
            Block::Image(_) => "image",
            Block::Video(_) => "video",
            Block::File(_) => "file",
            Block::Pdf(_) => "pdf",
            Block::Bookmark(_) => "bookmark",
            Block::Equation(_) => "equation",
            Block::Divider => "divider",
            Block::TableOfContents => "table_of_contents",
            Block::Breadcrumb => "breadcrumb",
            Block::ColumnList => "column_list",
            Block::Column => "column",
            Block::Template(_) => "template",
            Block::SyncedBlock(_) => "synced_block",
            Block::LinkToPage(_) => "link_to_page",
            Block::Audio(_) => "audio",
            Block::LinkPreview(_) => "link_preview",
            Block::Unsupported(_) => "unsupported",
            Block::Unrecognized { tag, .. } => tag,
        }
    }

    /// Decodes an API payload for the given discriminant.
    ///
    /// `payload` is the value stored under the key named after `tag`, or
    /// `Null` when the key is absent.
    pub fn decode(tag: &str, payload: Value) -> Result<Self, ModelError> {
        let block = match tag {
            "paragraph" => Block::Paragraph(decode_payload(tag, payload)?),
            "heading_1" => Block::Heading1(decode_payload(tag, payload)?),
            "heading_2" => Block::Heading2(decode_payload(tag, payload)?),
            "heading_3" => Block::Heading3(decode_payload(tag, payload)?),
            "callout" => Block::Callout(decode_payload(tag, payload)?),
            "quote" => Block::Quote(decode_payload(tag, payload)?),
            "bulleted_list_item" => Block::BulletedListItem(decode_payload(tag, payload)?),
            "numbered_list_item" => Block::NumberedListItem(decode_payload(tag, payload)?),
            "to_do" => Block::ToDo(decode_payload(tag, payload)?),
            "toggle" => Block::Toggle(decode_payload(tag, payload)?),
            "code" => Block::Code(decode_payload(tag, payload)?),
            "child_page" => Block::ChildPage(decode_payload(tag, payload)?),
            "child_database" => Block::ChildDatabase(decode_payload(tag, payload)?),
            "embed" => Block::Embed(decode_payload(tag, payload)?),
            "image" => Block::Image(decode_payload(tag, payload)?),
            "video" => Block::Video(decode_payload(tag, payload)?),
            "file" => Block::File(decode_payload(tag, payload)?),
            "pdf" => Block::Pdf(decode_payload(tag, payload)?),
            "bookmark" => Block::Bookmark(decode_payload(tag, payload)?),
            "equation" => Block::Equation(decode_payload(tag, payload)?),
            "divider" => Block::Divider,
            "table_of_contents" => Block::TableOfContents,
            "breadcrumb" => Block::Breadcrumb,
            "column_list" => Block::ColumnList,
            "column" => Block::Column,
            "template" => Block::Template(Opaque(payload)),
            "synced_block" => Block::SyncedBlock(decode_payload(tag, payload)?),
            "link_to_page" => Block::LinkToPage(decode_payload(tag, payload)?),
            "audio" => Block::Audio(Opaque(payload)),
            "link_preview" => Block::LinkPreview(decode_payload(tag, payload)?),
            "unsupported" => Block::Unsupported(Opaque(payload)),
            _ => Block::Unrecognized {
                tag: tag.to_string(),
                raw: Opaque(payload),
            },
        };
        Ok(block)
    }
}

fn decode_payload<T: DeserializeOwned>(tag: &str, payload: Value) -> Result<T, ModelError> {
    serde_json::from_value(payload).map_err(|source| ModelError::payload(tag, source))
}

/// A block plus its structural metadata and owned children.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawBlockNode")]
pub struct BlockNode {
    pub id: Uuid,
    /// Absent on legacy records.
    pub created_time: Option<DateTime<Utc>>,
    pub last_edited_time: Option<DateTime<Utc>>,
    pub has_children: bool,
    pub archived: bool,
    pub block: Block,
    pub children: Option<Vec<BlockNode>>,
}

impl BlockNode {
    /// Creates a node with no timestamps and no children.
    pub fn new(id: Uuid, block: Block) -> Self {
        Self {
            id,
            created_time: None,
            last_edited_time: None,
            has_children: false,
            archived: false,
            block,
            children: None,
        }
    }

    pub fn with_children(mut self, children: Vec<BlockNode>) -> Self {
        self.has_children = !children.is_empty();
        self.children = Some(children);
        self
    }

    pub fn children(&self) -> &[BlockNode] {
        self.children.as_deref().unwrap_or_default()
    }
}

/// Frees descendants through a heap worklist instead of recursing once per
/// nesting level.
impl Drop for BlockNode {
    fn drop(&mut self) {
        let Some(mut pending) = self.children.take() else {
            return;
        };
        while let Some(mut node) = pending.pop() {
            if let Some(children) = node.children.take() {
                pending.extend(children);
            }
        }
    }
}

#[derive(Deserialize)]
struct RawBlockNode {
    id: Uuid,
    created_time: Option<DateTime<Utc>>,
    last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    has_children: bool,
    #[serde(default)]
    archived: bool,
    #[serde(rename = "type")]
    kind: String,
    children: Option<Vec<BlockNode>>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl TryFrom<RawBlockNode> for BlockNode {
    type Error = ModelError;

    fn try_from(raw: RawBlockNode) -> Result<Self, Self::Error> {
        let RawBlockNode {
            id,
            created_time,
            last_edited_time,
            has_children,
            archived,
            kind,
            mut children,
            mut rest,
        } = raw;

        let block = match rest.remove(&kind) {
            Some(mut payload) => {
                // Append-style payloads nest children inside the body.
                if children.is_none()
                    && let Some(nested) = payload
                        .as_object_mut()
                        .and_then(|body| body.remove("children"))
                {
                    children = Some(decode_payload(&kind, nested)?);
                }
                Block::decode(&kind, payload)?
            }
            None if legacy::is_legacy_record(&kind, &rest) => legacy::decode(&kind, rest)?,
            None => Block::decode(&kind, Value::Null)?,
        };

        Ok(Self {
            id,
            created_time,
            last_edited_time,
            has_children: has_children || children.as_ref().is_some_and(|c| !c.is_empty()),
            archived,
            block,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const ID: &str = "7f6c7b3e-1d2a-4c3b-8e9f-0123456789ab";

    fn node(value: Value) -> BlockNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn api_heading_reads_rich_text_alias() {
        let n = node(json!({
            "object": "block",
            "id": ID,
            "created_time": "2021-05-13T12:00:00.000Z",
            "last_edited_time": "2021-05-14T08:30:00.000Z",
            "has_children": false,
            "archived": false,
            "type": "heading_1",
            "heading_1": { "rich_text": [{ "plain_text": "Title" }] }
        }));

        assert_eq!(
            n.block,
            Block::Heading1(RichTextBlock::new(vec![RichTextRun::plain("Title")]))
        );
        assert!(n.created_time.is_some());
        assert_eq!(n.block.discriminant(), "heading_1");
    }

    #[test]
    fn empty_payload_variants_ignore_their_body() {
        let n = node(json!({
            "id": ID, "type": "divider", "divider": { "unexpected": true }
        }));
        assert_eq!(n.block, Block::Divider);

        let n = node(json!({ "id": ID, "type": "breadcrumb" }));
        assert_eq!(n.block, Block::Breadcrumb);
    }

    #[test]
    fn unknown_discriminant_keeps_raw_payload() {
        let n = node(json!({
            "id": ID, "type": "table", "table": { "table_width": 2 }
        }));
        assert_eq!(
            n.block,
            Block::Unrecognized {
                tag: "table".into(),
                raw: Opaque(json!({ "table_width": 2 })),
            }
        );
        assert_eq!(n.block.discriminant(), "table");
    }

    #[test]
    fn opaque_bodies_are_preserved() {
        let n = node(json!({
            "id": ID, "type": "audio", "audio": { "anything": [1, 2, 3] }
        }));
        assert_eq!(n.block, Block::Audio(Opaque(json!({ "anything": [1, 2, 3] }))));
    }

    #[test]
    fn children_fall_back_to_payload_children() {
        let n = node(json!({
            "id": ID,
            "type": "bulleted_list_item",
            "bulleted_list_item": {
                "rich_text": [],
                "children": [{
                    "id": "00000000-0000-4000-8000-000000000002",
                    "type": "paragraph",
                    "paragraph": { "rich_text": [["nested"]] }
                }]
            }
        }));

        assert!(n.has_children);
        assert_eq!(n.children().len(), 1);
        assert_eq!(
            n.children()[0].block,
            Block::Paragraph(RichTextBlock::new(vec![RichTextRun::plain("nested")]))
        );
    }

    #[test]
    fn link_to_page_and_synced_block() {
        let target = "00000000-0000-4000-8000-0000000000aa";
        let n = node(json!({
            "id": ID, "type": "link_to_page",
            "link_to_page": { "type": "page_id", "page_id": target }
        }));
        assert_eq!(
            n.block,
            Block::LinkToPage(LinkToPage::PageId {
                page_id: Uuid::parse_str(target).unwrap()
            })
        );

        let n = node(json!({
            "id": ID, "type": "synced_block", "synced_block": { "synced_from": null }
        }));
        assert_eq!(n.block, Block::SyncedBlock(SyncedBlock { synced_from: None }));
    }

    #[test]
    fn malformed_known_payload_is_an_error() {
        let err = serde_json::from_value::<BlockNode>(json!({
            "id": ID, "type": "equation", "equation": { "expr": "x" }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("failed to decode equation payload"));
    }

    #[test]
    fn dropping_a_deep_tree_does_not_overflow() {
        let mut node = BlockNode::new(Uuid::from_u128(0), Block::Divider);
        for n in 1..100_000u128 {
            node = BlockNode::new(Uuid::from_u128(n), Block::Divider).with_children(vec![node]);
        }
        assert_eq!(node.children().len(), 1);
        drop(node);
    }

    #[test]
    fn known_payload_missing_entirely_is_an_error() {
        let result = serde_json::from_value::<BlockNode>(json!({
            "id": ID, "type": "bookmark"
        }));
        assert!(result.is_err());
    }
}
