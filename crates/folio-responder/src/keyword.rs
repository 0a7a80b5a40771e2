/// A compiled topic keyword.
///
/// `tech` matches the word "tech" only, `skill*` matches any word starting with
/// "skill", and `get in touch` matches those three words in sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    words: Vec<String>,
    stem: bool,
}

impl Keyword {
    /// Returns `None` for empty keywords and for words containing anything other
    /// than letters and digits, since those could never match a token.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        let (body, stem) = match raw.strip_suffix('*') {
            Some(body) => (body.trim_end(), true),
            None => (raw.as_str(), false),
        };

        let words: Vec<String> = body.split_whitespace().map(str::to_string).collect();
        if words.is_empty() || words.iter().any(|w| !w.chars().all(char::is_alphanumeric)) {
            return None;
        }

        Some(Self { words, stem })
    }

    pub fn matches(&self, tokens: &[String]) -> bool {
        let n = self.words.len();
        if tokens.len() < n {
            return false;
        }

        tokens.windows(n).any(|window| {
            window
                .iter()
                .zip(&self.words)
                .enumerate()
                .all(|(i, (token, word))| {
                    if self.stem && i == n - 1 {
                        token.starts_with(word.as_str())
                    } else {
                        token == word
                    }
                })
        })
    }
}

/// Lower-cased words of `text`; anything that is not a letter or digit separates words
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
