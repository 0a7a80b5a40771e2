use colored::Colorize;
use folio_markup::{Block, Fragment, Inline, Link, LinkKind};

/// Render a markup tree as styled terminal text
pub fn render_terminal(fragment: &Fragment) -> String {
    fragment
        .blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Paragraph(content) => render_inlines(content),
        Block::Heading { content, .. } => render_inlines(content).bold().underline().to_string(),
        Block::List(items) => items
            .iter()
            .map(|item| format!("  • {}", render_inlines(&item.content)))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::CodeBlock { language, code } => {
            let rule = match language {
                Some(language) => format!("── {} ──", language),
                None => "────".to_string(),
            };
            let body = code
                .lines()
                .map(|line| format!("  {}", line.cyan()))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{}\n{}\n{}", rule.dimmed(), body, "────".dimmed())
        }
    }
}

fn render_inlines(content: &[Inline]) -> String {
    let mut out = String::new();
    for inline in content {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Bold(text) => out.push_str(&text.bold().to_string()),
            Inline::Code(text) => out.push_str(&text.yellow().to_string()),
            Inline::Link(link) => out.push_str(&render_link(link)),
            Inline::LineBreak => out.push('\n'),
        }
    }
    out
}

fn render_link(link: &Link) -> String {
    let marker = match &link.kind {
        LinkKind::Download => "⬇ ",
        LinkKind::Social { .. } => "",
    };
    format!(
        "{}{} {}",
        marker,
        link.label.blue().underline(),
        format!("<{}>", link.href).dimmed()
    )
}
