//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape text and turn line breaks into `<br />`
pub fn text_with_breaks(s: &str) -> String {
    html_escape(s).replace('\n', "<br />")
}

/// Opening anchor tag, optionally targeting a new window
pub fn anchor_open(href: &str, target: Option<&str>) -> String {
    match target {
        Some(target) => format!(
            r#"<a href="{}" target="{}" rel="noopener noreferrer">"#,
            html_escape(href),
            html_escape(target)
        ),
        None => format!(r#"<a href="{}">"#, html_escape(href)),
    }
}

/// Generate an image tag
pub fn image_tag(src: &str, alt: Option<&str>) -> String {
    format!(
        r#"<img src="{}" alt="{}" />"#,
        html_escape(src),
        html_escape(alt.unwrap_or(""))
    )
}
