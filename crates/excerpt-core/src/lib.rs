use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A keyword credited to a paragraph could not be found again in its text.
    ///
    /// This is an internal logic error, not an expected outcome.
    #[error("keyword {keyword:?} not located in paragraph {paragraph}")]
    KeywordNotLocated { paragraph: usize, keyword: String },
    #[error("invalid keyword pattern: {0}")]
    Pattern(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Separator placed between trimmed paragraphs in an assembled snippet.
pub const SEGMENT_SEPARATOR: &str = " ... ";

pub const DEFAULT_MAX_LENGTH: usize = 80;
pub const DEFAULT_MAX_KEYWORDS: usize = 16;
/// Hard ceiling for `max_keywords`: scoring enumerates `2^k - 1` subsets.
pub const MAX_KEYWORDS_LIMIT: usize = 20;

/// A lower-cased, whitespace-collapsed search term. May be a phrase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    /// Normalize a raw keyword; `None` when it is blank.
    pub fn new(raw: &str) -> Option<Self> {
        let s = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if s.is_empty() {
            return None;
        }
        Some(Self(s.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_phrase(&self) -> bool {
        self.0.contains(' ')
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A blank-line-delimited block of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Zero-based position among the document's paragraphs.
    pub order: usize,
    /// Content with whitespace runs collapsed to single spaces.
    pub content: String,
}

impl Paragraph {
    /// Number of single-space separators in `content`.
    pub fn separator_count(&self) -> usize {
        self.content.bytes().filter(|b| *b == b' ').count()
    }
}

/// One trimmed paragraph in an assembled snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetSegment {
    /// Order index of the source paragraph.
    pub order: usize,
    pub text: String,
    /// Keywords this segment is responsible for highlighting (sorted).
    pub keywords: Vec<Keyword>,
    /// True when no context window fit the budget and the keywords alone were kept.
    pub fallback: bool,
}

/// An excerpt made of one segment per selected paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Segments in document order.
    pub segments: Vec<SnippetSegment>,
    /// Segment texts joined with [`SEGMENT_SEPARATOR`].
    pub text: String,
}

impl Snippet {
    pub fn from_segments(segments: Vec<SnippetSegment>) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(SEGMENT_SEPARATOR);
        Self { segments, text }
    }

    /// Keywords covered by this snippet, across all segments.
    pub fn covered(&self) -> Vec<&Keyword> {
        let mut out: Vec<&Keyword> = self.segments.iter().flat_map(|s| &s.keywords).collect();
        out.sort();
        out
    }
}

/// A keyword occurrence in a snippet's plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    /// Index into `Snippet::segments`.
    pub segment: usize,
    /// Character offset into `Snippet::text`.
    pub start_char: usize,
    /// Character offset into `Snippet::text` (exclusive).
    pub end_char: usize,
    /// The assigned keyword this occurrence matches.
    pub keyword: Keyword,
}

/// Markers placed around highlighted keyword occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    /// Inserted before every highlighted occurrence; never escaped.
    pub start: String,
    /// Inserted after every highlighted occurrence; never escaped.
    pub end: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            start: "<b>".to_string(),
            end: "</b>".to_string(),
        }
    }
}

/// Snippet knobs; see [`SnippetConfig::from_env`] for the environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetConfig {
    /// Overall character budget, shared evenly by the selected paragraphs.
    pub max_length: usize,
    /// Keywords beyond this many (after normalization) are ignored.
    pub max_keywords: usize,
    /// Highlight markers used when a call does not pass its own.
    pub delimiters: Delimiters,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            delimiters: Delimiters::default(),
        }
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_usize(key: &str) -> Option<usize> {
    env(key).and_then(|s| s.parse::<usize>().ok())
}

impl SnippetConfig {
    /// Defaults overlaid with `EXCERPT_*` environment knobs.
    ///
    /// Blank or unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(n) = env_usize("EXCERPT_MAX_LENGTH") {
            cfg.max_length = n;
        }
        if let Some(n) = env_usize("EXCERPT_MAX_KEYWORDS") {
            cfg.max_keywords = n;
        }
        if let Some(s) = env("EXCERPT_HIGHLIGHT_START") {
            cfg.delimiters.start = s;
        }
        if let Some(s) = env("EXCERPT_HIGHLIGHT_END") {
            cfg.delimiters.end = s;
        }
        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(Error::InvalidConfig("max_length must be > 0".to_string()));
        }
        if self.max_keywords == 0 || self.max_keywords > MAX_KEYWORDS_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "max_keywords must be in 1..={MAX_KEYWORDS_LIMIT}, got {}",
                self.max_keywords
            )));
        }
        Ok(())
    }
}

/// Escapes text for embedding in the markup output format.
///
/// Highlight delimiters are never passed through the escaper.
pub trait Escaper: Send + Sync {
    fn escape(&self, text: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_is_lowercased_and_whitespace_collapsed() {
        let k = Keyword::new("  Functional \t\n LANGUAGE ").unwrap();
        assert_eq!(k.as_str(), "functional language");
        assert!(k.is_phrase());
        assert!(Keyword::new(" \n ").is_none());
    }

    #[test]
    fn snippet_joins_segments_with_separator() {
        let seg = |order: usize, text: &str| SnippetSegment {
            order,
            text: text.to_string(),
            keywords: vec![],
            fallback: false,
        };
        let s = Snippet::from_segments(vec![seg(0, "alpha"), seg(3, "omega")]);
        assert_eq!(s.text, "alpha ... omega");
    }

    #[test]
    fn config_validation_bounds_keyword_cap() {
        assert!(SnippetConfig::default().validate().is_ok());
        let cfg = SnippetConfig {
            max_keywords: MAX_KEYWORDS_LIMIT + 1,
            ..SnippetConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
        let cfg = SnippetConfig {
            max_length: 0,
            ..SnippetConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn default_config_highlights_in_bold() {
        let cfg = SnippetConfig::default();
        assert_eq!(cfg.max_length, DEFAULT_MAX_LENGTH);
        assert_eq!(cfg.delimiters.start, "<b>");
        assert_eq!(cfg.delimiters.end, "</b>");
    }

    #[test]
    fn keyword_serializes_as_plain_string() {
        let k = Keyword::new("Bite").unwrap();
        assert_eq!(serde_json::to_string(&k).unwrap(), "\"bite\"");
    }
}
