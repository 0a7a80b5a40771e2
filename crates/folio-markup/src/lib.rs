//! Renderer for the small markup dialect used in assistant replies.
//!
//! Output is a structured [`Fragment`] the consuming layer can walk, or turn
//! into escaped HTML with [`Fragment::to_html`].

pub mod config;
pub mod engine;
pub mod html;
pub mod model;

pub use config::{MarkupConfig, SocialPlatform, DOWNLOAD_DIRECTIVE};
pub use engine::MarkupRenderer;
pub use html::escape_html;
pub use model::{Block, Fragment, Inline, Link, LinkKind, ListItem};

/// Render with the default configuration
pub fn render(text: &str) -> Fragment {
    MarkupRenderer::default().render(text)
}

/// Plain text of a rendered message, as copied to the clipboard
pub fn plain_text(text: &str) -> String {
    render(text).plain_text()
}
