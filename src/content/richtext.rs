//! Structured text as delivered by the CMS
//!
//! The block/span schema belongs to the content source. Callers only ever
//! need the plain text (for word counts) or the HTML rendering.

use serde::{Deserialize, Serialize};

use crate::helpers::{anchor_open, html_escape, image_tag, post_path, text_with_breaks};

/// Opaque rich-text value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(Vec<TextBlock>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TextBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    spans: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    oembed: Option<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Span {
    /// Offsets count UTF-16 code units
    start: usize,
    end: usize,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<SpanData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SpanData {
    #[serde(default)]
    link_type: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Embed {
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    embed_url: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    provider_name: Option<String>,
}

impl RichText {
    /// Build a rich text made of plain paragraphs
    #[cfg(test)]
    pub(crate) fn from_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            paragraphs
                .into_iter()
                .map(|text| TextBlock {
                    kind: "paragraph".to_string(),
                    text: Some(text.into()),
                    spans: Vec::new(),
                    url: None,
                    alt: None,
                    oembed: None,
                })
                .collect(),
        )
    }

    /// Plain text of every textual block, joined with a space
    pub fn as_text(&self) -> String {
        self.0
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render to HTML
    ///
    /// Consecutive list items are grouped into `<ul>` / `<ol>`. Links to
    /// documents resolve to their post page.
    pub fn as_html(&self) -> String {
        let mut html = String::new();
        let mut open_list: Option<&'static str> = None;

        for block in &self.0 {
            let list = match block.kind.as_str() {
                "list-item" => Some("ul"),
                "o-list-item" => Some("ol"),
                _ => None,
            };

            if open_list != list {
                if let Some(tag) = open_list {
                    html.push_str(&format!("</{}>", tag));
                }
                if let Some(tag) = list {
                    html.push_str(&format!("<{}>", tag));
                }
                open_list = list;
            }

            html.push_str(&block.to_html());
        }

        if let Some(tag) = open_list {
            html.push_str(&format!("</{}>", tag));
        }

        html
    }
}

impl TextBlock {
    fn to_html(&self) -> String {
        let inner = || serialize_spans(self.text.as_deref().unwrap_or(""), &self.spans);

        match self.kind.as_str() {
            "paragraph" => format!("<p>{}</p>", inner()),
            "preformatted" => format!("<pre>{}</pre>", inner()),
            "list-item" | "o-list-item" => format!("<li>{}</li>", inner()),
            "heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6" => {
                let level = &self.kind["heading".len()..];
                format!("<h{0}>{1}</h{0}>", level, inner())
            }
            "image" => match &self.url {
                Some(url) => format!(
                    r#"<p class="block-img">{}</p>"#,
                    image_tag(url, self.alt.as_deref())
                ),
                None => String::new(),
            },
            "embed" => match &self.oembed {
                Some(embed) => format!(
                    r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                    html_escape(embed.embed_url.as_deref().unwrap_or("")),
                    html_escape(embed.kind.as_deref().unwrap_or("")),
                    html_escape(&embed.provider_name.as_deref().unwrap_or("").to_lowercase()),
                    embed.html.as_deref().unwrap_or("")
                ),
                None => String::new(),
            },
            other => {
                tracing::debug!("Skipping unsupported rich text block: {}", other);
                String::new()
            }
        }
    }
}

impl Span {
    fn open_tag(&self) -> String {
        let data = self.data.clone().unwrap_or_default();
        match self.kind.as_str() {
            "strong" => "<strong>".to_string(),
            "em" => "<em>".to_string(),
            "hyperlink" => {
                let href = match (data.link_type.as_deref(), &data.uid, &data.url) {
                    (Some("Document"), Some(uid), _) => post_path(uid),
                    (_, _, Some(url)) => url.clone(),
                    _ => "#".to_string(),
                };
                anchor_open(&href, data.target.as_deref())
            }
            "label" => format!(
                r#"<span class="{}">"#,
                html_escape(data.label.as_deref().unwrap_or(""))
            ),
            _ => "<span>".to_string(),
        }
    }

    fn close_tag(&self) -> &'static str {
        match self.kind.as_str() {
            "strong" => "</strong>",
            "em" => "</em>",
            "hyperlink" => "</a>",
            _ => "</span>",
        }
    }
}

/// Wrap `text` in the tags described by `spans`
///
/// Crossing spans are split so the output always nests properly.
fn serialize_spans(text: &str, spans: &[Span]) -> String {
    let mut pending: Vec<&Span> = spans.iter().filter(|s| s.end > s.start).collect();
    pending.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(text.len());
    let mut open: Vec<&Span> = Vec::new();
    let mut next = 0;
    let mut offset = 0;
    let mut chars = text.chars();

    loop {
        if let Some(first) = open.iter().position(|s| s.end <= offset) {
            let closed: Vec<&Span> = open.drain(first..).collect();
            for span in closed.iter().rev() {
                out.push_str(span.close_tag());
            }
            for span in closed {
                if span.end > offset {
                    out.push_str(&span.open_tag());
                    open.push(span);
                }
            }
        }

        while next < pending.len() && pending[next].start <= offset {
            let span = pending[next];
            next += 1;
            if span.end > offset {
                out.push_str(&span.open_tag());
                open.push(span);
            }
        }

        match chars.next() {
            Some(c) => {
                let mut buf = [0u8; 4];
                out.push_str(&text_with_breaks(c.encode_utf8(&mut buf)));
                offset += c.len_utf16();
            }
            None => break,
        }
    }

    for span in open.iter().rev() {
        out.push_str(span.close_tag());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> RichText {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_as_text_joins_blocks() {
        let text = parse(json!([
            { "type": "heading2", "text": "Proin et varius", "spans": [] },
            { "type": "paragraph", "text": "Lorem ipsum dolor", "spans": [] },
            { "type": "image", "url": "https://images.prismic.io/x.png", "alt": null }
        ]));
        assert_eq!(text.as_text(), "Proin et varius Lorem ipsum dolor");
    }

    #[test]
    fn test_as_html_spans() {
        let text = parse(json!([{
            "type": "paragraph",
            "text": "Hello world & co",
            "spans": [
                { "start": 0, "end": 5, "type": "strong" },
                { "start": 6, "end": 11, "type": "hyperlink",
                  "data": { "link_type": "Web", "url": "https://rust-lang.org", "target": "_blank" } }
            ]
        }]));
        assert_eq!(
            text.as_html(),
            "<p><strong>Hello</strong> <a href=\"https://rust-lang.org\" target=\"_blank\" \
             rel=\"noopener noreferrer\">world</a> &amp; co</p>"
        );
    }

    #[test]
    fn test_crossing_spans_nest() {
        let text = parse(json!([{
            "type": "paragraph",
            "text": "abcdef",
            "spans": [
                { "start": 0, "end": 4, "type": "strong" },
                { "start": 2, "end": 6, "type": "em" }
            ]
        }]));
        assert_eq!(
            text.as_html(),
            "<p><strong>ab<em>cd</em></strong><em>ef</em></p>"
        );
    }

    #[test]
    fn test_utf16_offsets() {
        // "🚀" is two UTF-16 units
        let text = parse(json!([{
            "type": "paragraph",
            "text": "🚀 go",
            "spans": [{ "start": 3, "end": 5, "type": "em" }]
        }]));
        assert_eq!(text.as_html(), "<p>🚀 <em>go</em></p>");
    }

    #[test]
    fn test_document_link_and_lists() {
        let text = parse(json!([
            { "type": "list-item", "text": "one", "spans": [] },
            { "type": "list-item", "text": "two", "spans": [
                { "start": 0, "end": 3, "type": "hyperlink",
                  "data": { "link_type": "Document", "type": "posts", "uid": "criando-um-app" } }
            ] },
            { "type": "o-list-item", "text": "first", "spans": [] },
            { "type": "heading3", "text": "End\nline", "spans": [] }
        ]));
        assert_eq!(
            text.as_html(),
            "<ul><li>one</li><li><a href=\"/post/criando-um-app\">two</a></li></ul>\
             <ol><li>first</li></ol><h3>End<br />line</h3>"
        );
    }

    #[test]
    fn test_image_and_unknown_blocks() {
        let text = parse(json!([
            { "type": "image", "url": "https://img/x.png", "alt": "banner" },
            { "type": "mystery", "text": "ignored" }
        ]));
        assert_eq!(
            text.as_html(),
            r#"<p class="block-img"><img src="https://img/x.png" alt="banner" /></p>"#
        );
    }

    #[test]
    fn test_from_paragraphs() {
        let text = RichText::from_paragraphs(["a <b>", "c"]);
        assert_eq!(text.as_text(), "a <b> c");
        assert_eq!(text.as_html(), "<p>a &lt;b&gt;</p><p>c</p>");
    }
}
