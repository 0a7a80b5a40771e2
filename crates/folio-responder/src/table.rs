use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::error::{ResponderError, ResponderResult};
use crate::keyword::{tokenize, Keyword};

/// Placeholder replaced with the owner name when a table is built
pub const NAME_PLACEHOLDER: &str = "{name}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Greeting,
    Resume,
    Experience,
    Skills,
    Projects,
    Contact,
    Default,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Greeting => "greeting",
            Topic::Resume => "resume",
            Topic::Experience => "experience",
            Topic::Skills => "skills",
            Topic::Projects => "projects",
            Topic::Contact => "contact",
            Topic::Default => "default",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One topic bucket as written in a response table file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketConfig {
    pub topic: Topic,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub replies: Vec<String>,
}

/// Serialized form of a response table. Buckets are tested in order; `fallback`
/// answers anything no bucket matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseTableConfig {
    pub buckets: Vec<BucketConfig>,
    pub fallback: Vec<String>,
}

impl ResponseTableConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> ResponderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> ResponderResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Bucket {
    topic: Topic,
    keywords: Vec<Keyword>,
    replies: Vec<String>,
}

/// Immutable, validated response table. Every bucket has at least one reply.
#[derive(Debug, Clone)]
pub struct ResponseTable {
    buckets: Vec<Bucket>,
    fallback: Vec<String>,
}

impl ResponseTable {
    /// Compile `config`, substituting `{name}` in every reply with `owner`
    pub fn from_config(config: ResponseTableConfig, owner: &str) -> ResponderResult<Self> {
        let mut seen = HashSet::new();
        let mut buckets = Vec::with_capacity(config.buckets.len());

        for bucket in config.buckets {
            if bucket.topic == Topic::Default || !seen.insert(bucket.topic) {
                return Err(ResponderError::DuplicateTopic(bucket.topic));
            }
            if bucket.replies.is_empty() {
                return Err(ResponderError::EmptyBucket(bucket.topic));
            }

            let keywords = bucket
                .keywords
                .iter()
                .map(|raw| {
                    Keyword::parse(raw).ok_or_else(|| ResponderError::InvalidKeyword {
                        topic: bucket.topic,
                        keyword: raw.clone(),
                    })
                })
                .collect::<ResponderResult<Vec<_>>>()?;

            buckets.push(Bucket {
                topic: bucket.topic,
                keywords,
                replies: personalize(bucket.replies, owner),
            });
        }

        if config.fallback.is_empty() {
            return Err(ResponderError::EmptyBucket(Topic::Default));
        }

        Ok(Self {
            buckets,
            fallback: personalize(config.fallback, owner),
        })
    }

    pub fn from_file(path: impl AsRef<Path>, owner: &str) -> ResponderResult<Self> {
        let config = ResponseTableConfig::load_from_file(path)?;
        Self::from_config(config, owner)
    }

    /// The built-in portfolio table
    pub fn builtin(owner: &str) -> Self {
        let buckets = crate::builtin::default_buckets()
            .into_iter()
            .map(|b| Bucket {
                topic: b.topic,
                keywords: b.keywords.iter().filter_map(|k| Keyword::parse(k)).collect(),
                replies: personalize(b.replies, owner),
            })
            .collect();

        Self {
            buckets,
            fallback: personalize(crate::builtin::default_fallback(), owner),
        }
    }

    /// Topic for `utterance`. Blank input is a greeting when the table has one.
    pub fn classify(&self, utterance: &str) -> Topic {
        if utterance.trim().is_empty() {
            return if self.has_topic(Topic::Greeting) {
                Topic::Greeting
            } else {
                Topic::Default
            };
        }

        let tokens = tokenize(utterance);
        self.buckets
            .iter()
            .find(|b| b.keywords.iter().any(|k| k.matches(&tokens)))
            .map(|b| b.topic)
            .unwrap_or(Topic::Default)
    }

    pub fn replies(&self, topic: Topic) -> &[String] {
        self.buckets
            .iter()
            .find(|b| b.topic == topic)
            .map(|b| b.replies.as_slice())
            .unwrap_or(&self.fallback)
    }

    pub fn has_topic(&self, topic: Topic) -> bool {
        topic == Topic::Default || self.buckets.iter().any(|b| b.topic == topic)
    }

    /// Topics in matching order, ending with `Default`
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.buckets.iter().map(|b| b.topic).collect();
        topics.push(Topic::Default);
        topics
    }
}

fn personalize(replies: Vec<String>, owner: &str) -> Vec<String> {
    replies
        .into_iter()
        .map(|r| r.replace(NAME_PLACEHOLDER, owner))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ResponseTableConfig {
        ResponseTableConfig {
            buckets: vec![
                BucketConfig {
                    topic: Topic::Greeting,
                    keywords: vec!["hello".into()],
                    replies: vec!["Hi from {name}".into()],
                },
                BucketConfig {
                    topic: Topic::Skills,
                    keywords: vec!["rust*".into()],
                    replies: vec!["{name} writes Rust".into()],
                },
            ],
            fallback: vec!["Ask {name} directly".into()],
        }
    }

    #[test]
    fn test_from_config_personalizes() {
        let table = ResponseTable::from_config(small_config(), "Ada").unwrap();
        assert_eq!(table.replies(Topic::Greeting), ["Hi from Ada"]);
        assert_eq!(table.replies(Topic::Default), ["Ask Ada directly"]);
        // missing topics fall back
        assert_eq!(table.replies(Topic::Contact), ["Ask Ada directly"]);
    }

    #[test]
    fn test_classify_order_and_fallback() {
        let table = ResponseTable::from_config(small_config(), "Ada").unwrap();
        assert_eq!(table.classify("hello, rustacean"), Topic::Greeting);
        assert_eq!(table.classify("Rustacean?"), Topic::Skills);
        assert_eq!(table.classify("weather"), Topic::Default);
        assert_eq!(table.classify("   "), Topic::Greeting);
    }

    #[test]
    fn test_blank_without_greeting_bucket() {
        let mut config = small_config();
        config.buckets.remove(0);
        let table = ResponseTable::from_config(config, "Ada").unwrap();
        assert_eq!(table.classify(""), Topic::Default);
    }

    #[test]
    fn test_validation() {
        let mut config = small_config();
        config.buckets[1].replies.clear();
        assert!(matches!(
            ResponseTable::from_config(config, "Ada"),
            Err(ResponderError::EmptyBucket(Topic::Skills))
        ));

        let mut config = small_config();
        config.buckets[0].keywords.push("e-mail".into());
        assert!(matches!(
            ResponseTable::from_config(config, "Ada"),
            Err(ResponderError::InvalidKeyword { topic: Topic::Greeting, .. })
        ));

        let mut config = small_config();
        config.buckets.push(config.buckets[0].clone());
        assert!(matches!(
            ResponseTable::from_config(config, "Ada"),
            Err(ResponderError::DuplicateTopic(Topic::Greeting))
        ));

        let mut config = small_config();
        config.fallback.clear();
        assert!(ResponseTable::from_config(config, "Ada").is_err());
    }

    #[test]
    fn test_builtin_order() {
        let table = ResponseTable::builtin("Rolando");
        assert_eq!(
            table.topics(),
            vec![
                Topic::Greeting,
                Topic::Resume,
                Topic::Experience,
                Topic::Skills,
                Topic::Projects,
                Topic::Contact,
                Topic::Default,
            ]
        );
        for topic in table.topics() {
            assert!(!table.replies(topic).is_empty());
            assert!(table
                .replies(topic)
                .iter()
                .all(|r| !r.contains(NAME_PLACEHOLDER)));
        }
    }
}
