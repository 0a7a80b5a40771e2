use crate::model::{Block, Fragment, Inline, Link, LinkKind};

/// Escape text for use in HTML element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl Fragment {
    /// Serialize to HTML. All text, including attribute values, is escaped, so
    /// raw markup in the source never reaches the output.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            write_block(&mut out, block);
        }
        out
    }
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Paragraph(content) => {
            out.push_str("<p>");
            write_inlines(out, content);
            out.push_str("</p>");
        }
        Block::Heading { level, content } => {
            out.push_str(&format!("<h{}>", level));
            write_inlines(out, content);
            out.push_str(&format!("</h{}>", level));
        }
        Block::List(items) => {
            out.push_str("<ul>");
            for item in items {
                out.push_str("<li>");
                write_inlines(out, &item.content);
                out.push_str("</li>");
            }
            out.push_str("</ul>");
        }
        Block::CodeBlock { language, code } => {
            out.push_str("<pre data-copyable=\"true\"><code");
            if let Some(language) = language {
                out.push_str(&format!(" class=\"language-{}\"", escape_html(language)));
            }
            out.push('>');
            out.push_str(&escape_html(code));
            out.push_str("</code></pre>");
        }
    }
}

fn write_inlines(out: &mut String, content: &[Inline]) {
    for inline in content {
        match inline {
            Inline::Text(text) => out.push_str(&escape_html(text)),
            Inline::Bold(text) => {
                out.push_str("<strong>");
                out.push_str(&escape_html(text));
                out.push_str("</strong>");
            }
            Inline::Code(text) => {
                out.push_str("<code>");
                out.push_str(&escape_html(text));
                out.push_str("</code>");
            }
            Inline::Link(link) => write_link(out, link),
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
}

fn write_link(out: &mut String, link: &Link) {
    out.push_str(&format!("<a href=\"{}\"", escape_html(&link.href)));
    match &link.kind {
        LinkKind::Download => out.push_str(" download"),
        LinkKind::Social { icon, .. } => {
            out.push_str(&format!(" data-platform=\"{}\"", escape_html(icon)));
        }
    }
    if link.new_context {
        out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
    }
    out.push('>');
    out.push_str(&escape_html(&link.label));
    out.push_str("</a>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render("<script>alert(1)</script> **<i>x</i>**").to_html();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<i>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<strong>&lt;i&gt;x&lt;/i&gt;</strong>"));
    }

    #[test]
    fn test_code_block_html() {
        let html = render("```html\n<div>\n```").to_html();
        assert_eq!(
            html,
            "<pre data-copyable=\"true\"><code class=\"language-html\">&lt;div&gt;</code></pre>"
        );
    }

    #[test]
    fn test_link_html() {
        let html = render("[LinkedIn](https://linkedin.com/in/x) [DOWNLOAD_RESOURCE]").to_html();
        assert!(html.contains(
            "<a href=\"https://linkedin.com/in/x\" data-platform=\"linkedin\" target=\"_blank\" rel=\"noopener noreferrer\">LinkedIn</a>"
        ));
        assert!(html.contains("<a href=\"/resume.pdf\" download>Download Resume</a>"));
    }

    #[test]
    fn test_structure_html() {
        let html = render("## Hi\n- a\n- b\n\none\ntwo").to_html();
        assert_eq!(
            html,
            "<h2>Hi</h2><ul><li>a</li><li>b</li></ul><p>one<br>two</p>"
        );
    }
}
