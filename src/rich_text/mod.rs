use serde::{Deserialize, Serialize};

pub mod html_renderer;

pub use html_renderer::as_html;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "preformatted")]
    Preformatted,
    #[serde(rename = "heading1")]
    Heading1,
    #[serde(rename = "heading2")]
    Heading2,
    #[serde(rename = "heading3")]
    Heading3,
    #[serde(rename = "heading4")]
    Heading4,
    #[serde(rename = "heading5")]
    Heading5,
    #[serde(rename = "heading6")]
    Heading6,
    #[serde(rename = "list-item")]
    ListItem,
    #[serde(rename = "o-list-item")]
    OrderedListItem,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "embed")]
    Embed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanKind {
    #[serde(rename = "strong")]
    Strong,
    #[serde(rename = "em")]
    Em,
    #[serde(rename = "hyperlink")]
    Hyperlink,
    #[serde(rename = "label")]
    Label,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Inline formatting over a block's text. Offsets count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default)]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<serde_json::Value>,
}

impl RichTextBlock {
    pub fn paragraph(text: &str) -> Self {
        RichTextBlock {
            kind: BlockKind::Paragraph,
            text: text.to_string(),
            ..Default::default()
        }
    }
}

/// Plain text rendering: block texts joined by a single space.
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks.iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_text_joins_blocks() {
        let blocks = vec![
            RichTextBlock::paragraph("Lorem ipsum"),
            RichTextBlock {
                kind: BlockKind::Heading2,
                text: "dolor".to_string(),
                ..Default::default()
            },
        ];
        assert_eq!(as_text(&blocks), "Lorem ipsum dolor");
        assert_eq!(as_text(&[]), "");
    }

    #[test]
    fn test_deserialize_blocks() {
        let json = r##"[
            {"type": "paragraph", "text": "Hello world", "spans": [{"start": 0, "end": 5, "type": "strong"}]},
            {"type": "list-item", "text": "item", "spans": []},
            {"type": "something-new", "text": "kept"},
            {"text": "no type"}
        ]"##;
        let blocks: Vec<RichTextBlock> = serde_json::from_str(json).unwrap();
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(blocks[0].spans[0].kind, SpanKind::Strong);
        assert_eq!(blocks[1].kind, BlockKind::ListItem);
        assert_eq!(blocks[2].kind, BlockKind::Other);
        assert_eq!(blocks[3].kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_deserialize_hyperlink_span() {
        let json = r##"{"start": 2, "end": 9, "type": "hyperlink", "data": {"link_type": "Web", "url": "https://example.com"}}"##;
        let span: Span = serde_json::from_str(json).unwrap();
        assert_eq!(span.kind, SpanKind::Hyperlink);
        assert_eq!(span.data.unwrap().url.as_deref(), Some("https://example.com"));
    }
}
