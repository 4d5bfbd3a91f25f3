use crate::rich_text::{BlockKind, RichTextBlock, Span, SpanKind};

#[derive(Clone, Copy, PartialEq)]
enum ListKind {
    Unordered,
    Ordered,
}

/// Renders rich text blocks to HTML. Consecutive list items are grouped in a
/// single `<ul>`/`<ol>`.
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<ListKind> = None;

    for block in blocks {
        let list_kind = match block.kind {
            BlockKind::ListItem => Some(ListKind::Unordered),
            BlockKind::OrderedListItem => Some(ListKind::Ordered),
            _ => None,
        };

        if open_list != list_kind {
            if let Some(kind) = open_list {
                html.push_str(close_list_tag(kind));
            }
            if let Some(kind) = list_kind {
                html.push_str(open_list_tag(kind));
            }
            open_list = list_kind;
        }

        render_block(&mut html, block);
    }

    if let Some(kind) = open_list {
        html.push_str(close_list_tag(kind));
    }

    html
}

fn open_list_tag(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Unordered => "<ul>",
        ListKind::Ordered => "<ol>",
    }
}

fn close_list_tag(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Unordered => "</ul>",
        ListKind::Ordered => "</ol>",
    }
}

fn render_block(html: &mut String, block: &RichTextBlock) {
    let tag = match block.kind {
        BlockKind::Paragraph => "p",
        BlockKind::Preformatted => "pre",
        BlockKind::Heading1 => "h1",
        BlockKind::Heading2 => "h2",
        BlockKind::Heading3 => "h3",
        BlockKind::Heading4 => "h4",
        BlockKind::Heading5 => "h5",
        BlockKind::Heading6 => "h6",
        BlockKind::ListItem | BlockKind::OrderedListItem => "li",
        BlockKind::Image => {
            render_image(html, block);
            return;
        }
        BlockKind::Embed => {
            render_embed(html, block);
            return;
        }
        BlockKind::Other => return,
    };

    html.push('<');
    html.push_str(tag);
    html.push('>');
    render_spans(html, &block.text, &block.spans);
    html.push_str("</");
    html.push_str(tag);
    html.push('>');
}

fn render_image(html: &mut String, block: &RichTextBlock) {
    let Some(ref url) = block.url else {
        return;
    };
    let alt = block.alt.as_deref().unwrap_or("");
    html.push_str(&format!(
        r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
        escape_html(url),
        escape_html(alt)
    ));
}

fn render_embed(html: &mut String, block: &RichTextBlock) {
    let Some(ref oembed) = block.oembed else {
        return;
    };
    let embed_url = oembed.get("embed_url").and_then(|v| v.as_str()).unwrap_or("");
    let embed_type = oembed.get("type").and_then(|v| v.as_str()).unwrap_or("");
    let embed_html = oembed.get("html").and_then(|v| v.as_str()).unwrap_or("");
    html.push_str(&format!(
        r#"<div data-oembed="{}" data-oembed-type="{}">{}</div>"#,
        escape_html(embed_url),
        escape_html(embed_type),
        embed_html
    ));
}

fn open_span_tag(span: &Span) -> String {
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => {
            let url = span.data.as_ref().and_then(|d| d.url.as_deref()).unwrap_or("");
            format!(r#"<a href="{}">"#, escape_html(url))
        }
        SpanKind::Label => {
            let label = span.data.as_ref().and_then(|d| d.label.as_deref()).unwrap_or("");
            format!(r#"<span class="{}">"#, escape_html(label))
        }
        SpanKind::Other => String::new(),
    }
}

fn close_span_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label => "</span>",
        SpanKind::Other => "",
    }
}

fn is_renderable(span: &Span) -> bool {
    match span.kind {
        SpanKind::Hyperlink => span.data.as_ref().and_then(|d| d.url.as_ref()).is_some(),
        SpanKind::Other => false,
        _ => true,
    }
}

/// Writes `text` with its spans applied. The text is cut at every span
/// boundary; for each segment the open tags are kept as long as they are a
/// prefix of the spans covering it, so the output is always well nested.
fn render_spans(html: &mut String, text: &str, spans: &[Span]) {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    // Spans are ordered by start, longest first, so outer spans open first.
    let mut spans: Vec<&Span> = spans.iter()
        .filter(|s| is_renderable(s) && s.start < s.end && s.start < len)
        .collect();
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut boundaries: Vec<usize> = vec![0, len];
    for span in spans.iter() {
        boundaries.push(span.start);
        boundaries.push(span.end.min(len));
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut stack: Vec<usize> = vec![];
    for window in boundaries.windows(2) {
        let (from, to) = (window[0], window[1]);
        let covering: Vec<usize> = spans.iter()
            .enumerate()
            .filter(|(_, s)| s.start <= from && s.end.min(len) >= to)
            .map(|(i, _)| i)
            .collect();

        let common = stack.iter()
            .zip(covering.iter())
            .take_while(|(a, b)| a == b)
            .count();

        while stack.len() > common {
            if let Some(i) = stack.pop() {
                html.push_str(close_span_tag(spans[i]));
            }
        }
        for i in covering.iter().skip(common) {
            html.push_str(&open_span_tag(spans[*i]));
            stack.push(*i);
        }

        let segment: String = chars[from..to].iter().collect();
        push_text(html, &segment);
    }

    while let Some(i) = stack.pop() {
        html.push_str(close_span_tag(spans[i]));
    }
}

fn push_text(html: &mut String, text: &str) {
    let mut lines = text.split('\n');
    if let Some(first) = lines.next() {
        html.push_str(&escape_html(first));
    }
    for line in lines {
        html.push_str("<br />");
        html.push_str(&escape_html(line));
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
