//! Highlight markup and keyword offsets for assembled snippets.
//!
//! Each segment is re-scanned only for the keywords assigned to it. Rendering never
//! changes the snippet itself.

use crate::textprep::{self, Matcher};
use excerpt_core::{
    Delimiters, Error, Escaper, HighlightSpan, Result, Snippet, SnippetSegment,
    SEGMENT_SEPARATOR,
};

/// Escapes `& < > " '` for HTML/XML text and attribute content.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscaper;

impl Escaper for HtmlEscaper {
    fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(ch),
            }
        }
        out
    }
}

/// Passes text through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEscape;

impl Escaper for NoEscape {
    fn escape(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Every assigned keyword must still occur in the trimmed text.
fn check_located(segment: &SnippetSegment) -> Result<()> {
    for k in &segment.keywords {
        if !Matcher::new(k.clone())?.is_match(&segment.text) {
            return Err(Error::KeywordNotLocated {
                paragraph: segment.order,
                keyword: k.to_string(),
            });
        }
    }
    Ok(())
}

/// Wrap every occurrence of the segment's keywords in `delimiters`.
///
/// Matches come from one leftmost-first alternation, so when two assigned phrases overlap
/// (`"bite the"` and `"the bullet"` in "bite the bullet") only the earlier one is marked.
pub fn render_segment(
    segment: &SnippetSegment,
    delimiters: &Delimiters,
    escaper: &dyn Escaper,
) -> Result<String> {
    check_located(segment)?;
    let Some(re) = textprep::alternation(&segment.keywords)? else {
        return Ok(escaper.escape(&segment.text));
    };

    let text = segment.text.as_str();
    let mut out = String::with_capacity(text.len() * 2);
    let mut last = 0usize;
    for m in re.find_iter(text) {
        out.push_str(&escaper.escape(&text[last..m.start()]));
        out.push_str(&delimiters.start);
        out.push_str(&escaper.escape(m.as_str()));
        out.push_str(&delimiters.end);
        last = m.end();
    }
    out.push_str(&escaper.escape(&text[last..]));
    Ok(out)
}

/// Render a whole snippet; segments are joined with an escaped `" ... "`.
pub fn render(snippet: &Snippet, delimiters: &Delimiters, escaper: &dyn Escaper) -> Result<String> {
    let parts = snippet
        .segments
        .iter()
        .map(|s| render_segment(s, delimiters, escaper))
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join(escaper.escape(SEGMENT_SEPARATOR).as_str()))
}

/// Keyword occurrences as char offsets into `snippet.text`.
///
/// Uses the same alternation as [`render_segment`]: overlapping phrases yield a span
/// only for the one that starts first.
pub fn spans(snippet: &Snippet) -> Result<Vec<HighlightSpan>> {
    let sep_chars = SEGMENT_SEPARATOR.chars().count();
    let mut out = Vec::new();
    let mut base = 0usize;

    for (idx, seg) in snippet.segments.iter().enumerate() {
        check_located(seg)?;
        let matchers = textprep::matchers(&seg.keywords)?;
        if let Some(re) = textprep::alternation(&seg.keywords)? {
            let text = seg.text.as_str();
            for m in re.find_iter(text) {
                let keyword = matchers
                    .iter()
                    .find(|k| k.matches_exactly(m.as_str()))
                    .map(|k| k.keyword.clone())
                    .ok_or_else(|| Error::KeywordNotLocated {
                        paragraph: seg.order,
                        keyword: m.as_str().to_string(),
                    })?;
                let start_char = base + text[..m.start()].chars().count();
                out.push(HighlightSpan {
                    segment: idx,
                    start_char,
                    end_char: start_char + m.as_str().chars().count(),
                    keyword,
                });
            }
        }
        base += seg.text.chars().count() + sep_chars;
    }
    Ok(out)
}
