use serde::{Deserialize, Serialize};

/// Directive token expanded into the download action
pub const DOWNLOAD_DIRECTIVE: &str = "[DOWNLOAD_RESOURCE]";

/// Renderer settings: where the download action points and which social
/// platforms may be linked from assistant text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarkupConfig {
    pub download_href: String,
    pub download_label: String,
    pub social_platforms: Vec<SocialPlatform>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            download_href: "/resume.pdf".to_string(),
            download_label: "Download Resume".to_string(),
            social_platforms: vec![
                SocialPlatform::new("GitHub", "github"),
                SocialPlatform::new("LinkedIn", "linkedin"),
                SocialPlatform::new("Facebook", "facebook"),
                SocialPlatform::new("Instagram", "instagram"),
                SocialPlatform::new("X", "x"),
                SocialPlatform::new("Twitter", "twitter"),
                SocialPlatform::new("Email", "email"),
            ],
        }
    }
}

impl MarkupConfig {
    /// Look up an allow-listed platform by its display name, ignoring case
    pub fn platform(&self, name: &str) -> Option<&SocialPlatform> {
        let name = name.trim();
        self.social_platforms
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn with_download(mut self, href: impl Into<String>, label: impl Into<String>) -> Self {
        self.download_href = href.into();
        self.download_label = label.into();
        self
    }
}

/// An allow-listed social platform. `icon` is an identifier for the consuming
/// layer; the renderer never emits icon markup itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialPlatform {
    pub name: String,
    pub icon: String,
}

impl SocialPlatform {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}
