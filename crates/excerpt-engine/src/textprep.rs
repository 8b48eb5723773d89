//! Minimal, deterministic text normalization and keyword matching helpers.
//!
//! All matching is case-insensitive and word-boundary aware. Phrase keywords match their
//! internal single spaces literally, so callers must match against whitespace-collapsed text.

use excerpt_core::{Error, Keyword, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Collapse every whitespace run to a single space and trim both ends.
pub fn collapse_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Normalize raw keywords: drop blanks, collapse duplicates, cap the count.
///
/// The first occurrence of a duplicate wins; keywords past `cap` are ignored. Which
/// keywords survive the cap therefore depends on input order, so results are independent
/// of keyword order only while the distinct keyword count stays within `cap`.
pub fn prepare_keywords<I, S>(raw: I, cap: usize) -> Vec<Keyword>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut dropped = 0usize;
    for r in raw {
        let Some(k) = Keyword::new(r.as_ref()) else {
            continue;
        };
        if !seen.insert(k.clone()) {
            continue;
        }
        if out.len() >= cap {
            dropped += 1;
            continue;
        }
        out.push(k);
    }
    if dropped > 0 {
        tracing::warn!(cap, dropped, "keyword cap reached; extra keywords ignored");
    }
    out
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Regex source for one keyword, anchored on word boundaries.
///
/// A boundary assertion is only emitted next to a word character: `\b` before a leading
/// `+` or `.` would demand a word character on the outside instead.
pub fn keyword_pattern(keyword: &Keyword) -> String {
    let s = keyword.as_str();
    let mut out = String::with_capacity(s.len() + 4);
    if s.chars().next().is_some_and(is_word_char) {
        out.push_str(r"\b");
    }
    out.push_str(&regex::escape(s));
    if s.chars().next_back().is_some_and(is_word_char) {
        out.push_str(r"\b");
    }
    out
}

fn build(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Pattern(e.to_string()))
}

/// A keyword together with its compiled matcher.
#[derive(Debug, Clone)]
pub struct Matcher {
    pub keyword: Keyword,
    pub regex: Regex,
}

impl Matcher {
    pub fn new(keyword: Keyword) -> Result<Self> {
        let regex = build(&keyword_pattern(&keyword))?;
        Ok(Self { keyword, regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// True when the whole of `text` is one occurrence of this keyword.
    pub fn matches_exactly(&self, text: &str) -> bool {
        self.regex
            .find(text)
            .is_some_and(|m| m.start() == 0 && m.end() == text.len())
    }
}

pub fn matchers(keywords: &[Keyword]) -> Result<Vec<Matcher>> {
    keywords.iter().cloned().map(Matcher::new).collect()
}

/// One alternation over several keywords, longest keyword first.
///
/// Longest-first makes a phrase win over a single keyword it starts with.
/// `None` when `keywords` is empty.
pub fn alternation<'a, I>(keywords: I) -> Result<Option<Regex>>
where
    I: IntoIterator<Item = &'a Keyword>,
{
    let mut ks: Vec<&Keyword> = keywords.into_iter().collect();
    if ks.is_empty() {
        return Ok(None);
    }
    ks.sort_by(|a, b| {
        b.as_str()
            .len()
            .cmp(&a.as_str().len())
            .then_with(|| a.cmp(b))
    });
    let pattern = ks
        .iter()
        .map(|k| format!("(?:{})", keyword_pattern(k)))
        .collect::<Vec<_>>()
        .join("|");
    build(&pattern).map(Some)
}
