use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::config::{MarkupConfig, DOWNLOAD_DIRECTIVE};
use crate::model::{Block, Fragment, Inline, Link, LinkKind, ListItem};

static DOWNLOAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(&regex::escape(DOWNLOAD_DIRECTIVE)).expect("download directive regex"));
static SOCIAL_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]\n]+)\]\(([^()\s]+)\)").expect("social link regex"));
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\n]+)`").expect("inline code regex"));
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").expect("bold regex"));
static FENCE_LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_+#.-]*$").expect("fence language regex"));

const FENCE: &str = "```";

/// Intermediate inline state: text still open to later passes, or a finished node
/// that later passes must leave alone.
enum Piece {
    Raw(String),
    Done(Inline),
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    paragraph: Vec<Inline>,
    list: Vec<ListItem>,
}

impl BlockBuilder {
    fn flush_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            self.blocks
                .push(Block::Paragraph(std::mem::take(&mut self.paragraph)));
        }
    }

    fn flush_list(&mut self) {
        if !self.list.is_empty() {
            self.blocks.push(Block::List(std::mem::take(&mut self.list)));
        }
    }

    fn flush(&mut self) {
        self.flush_paragraph();
        self.flush_list();
    }

    fn finish(mut self) -> Fragment {
        self.flush();
        Fragment {
            blocks: self.blocks,
        }
    }
}

/// Renders assistant-authored text in the widget dialect into a [`Fragment`].
///
/// Fenced code is cut out before anything else looks at the text, then each
/// remaining line goes through the inline passes in a fixed order: download
/// directive, social links, inline code, bold. A span claimed by one pass is
/// never seen by the passes after it. Malformed syntax stays literal text.
#[derive(Debug, Clone, Default)]
pub struct MarkupRenderer {
    config: MarkupConfig,
}

impl MarkupRenderer {
    pub fn new(config: MarkupConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MarkupConfig {
        &self.config
    }

    pub fn render(&self, text: &str) -> Fragment {
        let normalized = text.replace("\r\n", "\n");
        let lines: Vec<&str> = normalized.split('\n').collect();
        let mut builder = BlockBuilder::default();

        let mut i = 0;
        while i < lines.len() {
            if let Some(language) = fence_open(lines[i]) {
                if let Some((close, code)) = fence_body(&lines, i + 1) {
                    builder.flush();
                    builder.blocks.push(Block::CodeBlock { language, code });
                    i = close + 1;
                    continue;
                }
                // unclosed fence: the opening line is ordinary text
            }
            self.push_line(&mut builder, lines[i]);
            i += 1;
        }

        builder.finish()
    }

    fn push_line(&self, builder: &mut BlockBuilder, line: &str) {
        let line = line.trim_end();
        if line.trim().is_empty() {
            builder.flush();
            return;
        }

        if let Some((level, rest)) = heading(line) {
            builder.flush();
            builder.blocks.push(Block::Heading {
                level,
                content: self.render_inline(rest),
            });
            return;
        }

        if let Some(rest) = line.trim_start().strip_prefix("- ") {
            builder.flush_paragraph();
            builder.list.push(ListItem {
                content: self.render_inline(rest),
            });
            return;
        }

        builder.flush_list();
        if !builder.paragraph.is_empty() {
            builder.paragraph.push(Inline::LineBreak);
        }
        builder.paragraph.extend(self.render_inline(line));
    }

    /// Run the inline passes over a single line of text
    pub fn render_inline(&self, text: &str) -> Vec<Inline> {
        let pieces = vec![Piece::Raw(text.to_string())];

        let pieces = split_pass(pieces, &DOWNLOAD, |_| {
            Some(Inline::Link(Link {
                kind: LinkKind::Download,
                label: self.config.download_label.clone(),
                href: self.config.download_href.clone(),
                new_context: false,
            }))
        });

        let pieces = split_pass(pieces, &SOCIAL_LINK, |caps| {
            let platform = self.config.platform(&caps[1])?;
            let href = caps[2].trim();
            if !is_safe_href(href) {
                return None;
            }
            Some(Inline::Link(Link {
                kind: LinkKind::Social {
                    platform: platform.name.clone(),
                    icon: platform.icon.clone(),
                },
                label: platform.name.clone(),
                href: href.to_string(),
                new_context: true,
            }))
        });

        let pieces = split_pass(pieces, &INLINE_CODE, |caps| {
            Some(Inline::Code(caps[1].to_string()))
        });

        let pieces = split_pass(pieces, &BOLD, |caps| {
            let inner = caps.get(1).or_else(|| caps.get(2))?.as_str();
            if inner.trim().is_empty() {
                return None;
            }
            Some(Inline::Bold(inner.to_string()))
        });

        let mut out: Vec<Inline> = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let inline = match piece {
                Piece::Raw(text) => Inline::Text(text),
                Piece::Done(inline) => inline,
            };
            match (out.last_mut(), inline) {
                (Some(Inline::Text(prev)), Inline::Text(next)) => prev.push_str(&next),
                (_, inline) => out.push(inline),
            }
        }
        out
    }
}

/// Split every raw piece on `re`. `convert` returns `None` to leave a match as
/// literal text, which later passes may still look at.
fn split_pass<F>(pieces: Vec<Piece>, re: &Regex, mut convert: F) -> Vec<Piece>
where
    F: FnMut(&Captures) -> Option<Inline>,
{
    let mut out = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let raw = match piece {
            Piece::Raw(raw) => raw,
            done => {
                out.push(done);
                continue;
            }
        };

        let mut literal = String::new();
        let mut last = 0;
        for caps in re.captures_iter(&raw) {
            let Some(whole) = caps.get(0) else { continue };
            match convert(&caps) {
                Some(inline) => {
                    literal.push_str(&raw[last..whole.start()]);
                    if !literal.is_empty() {
                        out.push(Piece::Raw(std::mem::take(&mut literal)));
                    }
                    out.push(Piece::Done(inline));
                }
                None => literal.push_str(&raw[last..whole.end()]),
            }
            last = whole.end();
        }
        literal.push_str(&raw[last..]);
        if !literal.is_empty() {
            out.push(Piece::Raw(literal));
        }
    }
    out
}

/// Opening fence with an optional language tag. Returns `Some(language)`.
fn fence_open(line: &str) -> Option<Option<String>> {
    let rest = line.trim().strip_prefix(FENCE)?.trim();
    if rest.contains(FENCE) || !FENCE_LANGUAGE.is_match(rest) {
        return None;
    }
    Some((!rest.is_empty()).then(|| rest.to_string()))
}

/// Collect the fence body starting at `start`; returns the closing line index.
/// A line that ends in a fence closes the block and contributes its prefix.
fn fence_body(lines: &[&str], start: usize) -> Option<(usize, String)> {
    let mut body: Vec<&str> = Vec::new();
    for (idx, line) in lines.iter().enumerate().skip(start) {
        let trimmed = line.trim_end();
        if trimmed.trim_start() == FENCE {
            return Some((idx, body.join("\n")));
        }
        if let Some(prefix) = trimmed.strip_suffix(FENCE) {
            body.push(prefix);
            return Some((idx, body.join("\n")));
        }
        body.push(line);
    }
    None
}

fn heading(line: &str) -> Option<(u8, &str)> {
    if let Some(rest) = line.strip_prefix("### ") {
        Some((3, rest))
    } else {
        line.strip_prefix("## ").map(|rest| (2, rest))
    }
}

fn is_safe_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    let scheme_ok = lower.starts_with("https://")
        || lower.starts_with("http://")
        || lower.starts_with("mailto:");
    scheme_ok && !href.contains(['"', '\'', '<', '>', '`'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(text: &str) -> Fragment {
        MarkupRenderer::default().render(text)
    }

    fn paragraph(fragment: &Fragment) -> &Vec<Inline> {
        match &fragment.blocks[0] {
            Block::Paragraph(content) => content,
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_fenced_code_is_verbatim() {
        let fragment = render("```js\n**not bold**\n```");
        assert_eq!(
            fragment.blocks,
            vec![Block::CodeBlock {
                language: Some("js".to_string()),
                code: "**not bold**".to_string(),
            }]
        );
    }

    #[test]
    fn test_fenced_code_keeps_list_and_backticks() {
        let fragment = render("Here:\n```\n- item\n`tick` __x__\n## not a heading\n```\nDone");
        assert_eq!(fragment.blocks.len(), 3);
        match &fragment.blocks[1] {
            Block::CodeBlock { language, code } => {
                assert_eq!(language, &None);
                assert_eq!(code, "- item\n`tick` __x__\n## not a heading");
            }
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_closing_fence_after_content() {
        let fragment = render("```rust\nfn main() {}```");
        assert_eq!(fragment.code_blocks().collect::<Vec<_>>(), vec!["fn main() {}"]);
    }

    #[test]
    fn test_unclosed_fence_degrades_to_text() {
        let fragment = render("```js\n**still bold**");
        assert!(fragment.code_blocks().next().is_none());
        let content = paragraph(&fragment);
        assert_eq!(content[0], Inline::Text("```js".to_string()));
        assert!(content.contains(&Inline::Bold("still bold".to_string())));
    }

    #[test]
    fn test_bold_both_delimiters() {
        let fragment = render("**React** and __Rust__");
        assert_eq!(
            paragraph(&fragment),
            &vec![
                Inline::Bold("React".into()),
                Inline::Text(" and ".into()),
                Inline::Bold("Rust".into()),
            ]
        );
    }

    #[test]
    fn test_inline_code_shields_bold() {
        let fragment = render("use `**kwargs` here");
        assert_eq!(
            paragraph(&fragment),
            &vec![
                Inline::Text("use ".into()),
                Inline::Code("**kwargs".into()),
                Inline::Text(" here".into()),
            ]
        );
    }

    #[test]
    fn test_download_directive() {
        let fragment = render("Grab it: [DOWNLOAD_RESOURCE]");
        let links = fragment.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].kind, LinkKind::Download);
        assert_eq!(links[0].href, "/resume.pdf");
        assert!(!links[0].new_context);
    }

    #[test]
    fn test_social_link_allow_list() {
        let fragment = render("Find me on [github](https://github.com/someone)");
        let links = fragment.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, "GitHub");
        assert!(links[0].new_context);
        match &links[0].kind {
            LinkKind::Social { platform, icon } => {
                assert_eq!(platform, "GitHub");
                assert_eq!(icon, "github");
            }
            other => panic!("expected social link, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_platform_stays_literal() {
        let text = "[MySpace](https://myspace.com/x)";
        let fragment = render(text);
        assert!(fragment.links().is_empty());
        assert_eq!(paragraph(&fragment), &vec![Inline::Text(text.into())]);
    }

    #[test]
    fn test_script_url_stays_literal() {
        let fragment = render("[GitHub](javascript:alert(1))");
        assert!(fragment.links().is_empty());
    }

    #[test]
    fn test_headings_and_lists() {
        let fragment = render("## Skills\n- Rust\n- **Go**\n### Projects\ntext");
        assert_eq!(fragment.blocks.len(), 4);
        assert!(matches!(&fragment.blocks[0], Block::Heading { level: 2, .. }));
        match &fragment.blocks[1] {
            Block::List(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].content, vec![Inline::Bold("Go".into())]);
            }
            other => panic!("expected list, got {:?}", other),
        }
        assert!(matches!(&fragment.blocks[2], Block::Heading { level: 3, .. }));
        assert!(matches!(&fragment.blocks[3], Block::Paragraph(_)));
    }

    #[test]
    fn test_separate_lists_split_by_paragraph() {
        let fragment = render("- a\n- b\nmiddle\n- c");
        let lists = fragment
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::List(_)))
            .count();
        assert_eq!(lists, 2);
    }

    #[test]
    fn test_line_breaks_and_paragraphs() {
        let fragment = render("one\ntwo\n\nthree");
        assert_eq!(fragment.blocks.len(), 2);
        assert_eq!(
            paragraph(&fragment),
            &vec![
                Inline::Text("one".into()),
                Inline::LineBreak,
                Inline::Text("two".into()),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(render("").is_empty());
        assert!(render("\n\n  \n").is_empty());
    }
}
