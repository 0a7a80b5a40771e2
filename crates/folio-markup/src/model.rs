//! Rendered structure. Every string in here is plain text; nothing is
//! pre-escaped and nothing is markup.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Heading { level: u8, content: Vec<Inline> },
    List(Vec<ListItem>),
    CodeBlock { language: Option<String>, code: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListItem {
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Code(String),
    Link(Link),
    LineBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub kind: LinkKind,
    pub label: String,
    pub href: String,
    /// Open in a new browsing context
    pub new_context: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    Download,
    Social { platform: String, icon: String },
}

impl Fragment {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Text content with all structure stripped, as used for copy-to-clipboard.
    /// Blocks are separated by a blank line, list items and line breaks by a newline.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// All code block bodies, in order
    pub fn code_blocks(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::CodeBlock { code, .. } => Some(code.as_str()),
            _ => None,
        })
    }

    /// All links, in document order
    pub fn links(&self) -> Vec<&Link> {
        let mut links = Vec::new();
        for block in &self.blocks {
            let inlines: Vec<&Vec<Inline>> = match block {
                Block::Paragraph(content) | Block::Heading { content, .. } => vec![content],
                Block::List(items) => items.iter().map(|i| &i.content).collect(),
                Block::CodeBlock { .. } => Vec::new(),
            };
            for content in inlines {
                links.extend(content.iter().filter_map(|i| match i {
                    Inline::Link(link) => Some(link),
                    _ => None,
                }));
            }
        }
        links
    }
}

impl Block {
    fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(content) | Block::Heading { content, .. } => inline_text(content),
            Block::List(items) => items
                .iter()
                .map(|item| inline_text(&item.content))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::CodeBlock { code, .. } => code.clone(),
        }
    }
}

pub(crate) fn inline_text(content: &[Inline]) -> String {
    let mut out = String::new();
    for inline in content {
        match inline {
            Inline::Text(text) | Inline::Bold(text) | Inline::Code(text) => out.push_str(text),
            Inline::Link(link) => out.push_str(&link.label),
            Inline::LineBreak => out.push('\n'),
        }
    }
    out
}
