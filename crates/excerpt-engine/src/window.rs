//! Word-aligned context windows around keyword occurrences.

use crate::textprep::{self, Matcher};
use excerpt_core::{Error, Result, SEGMENT_SEPARATOR};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub text: String,
    /// Context words kept on each side of the covering span; `None` for the fallback.
    pub radius: Option<usize>,
}

impl Window {
    pub fn is_fallback(&self) -> bool {
        self.radius.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
struct Occurrence {
    first_word: usize,
    last_word: usize,
    start: usize,
    end: usize,
}

/// Smallest word span holding one occurrence of every target, earliest on ties.
///
/// Returns `(lo, hi, chosen)` with `chosen[t]` the occurrence used for target `t`.
fn covering_span(occ: &[Vec<Occurrence>]) -> Option<(usize, usize, Vec<Occurrence>)> {
    let mut best: Option<(usize, usize, Vec<Occurrence>)> = None;
    for anchor in occ.iter().flatten() {
        let lo = anchor.first_word;
        let mut chosen = Vec::with_capacity(occ.len());
        for list in occ {
            let pick = list
                .iter()
                .filter(|o| o.first_word >= lo)
                .min_by_key(|o| (o.last_word, o.first_word));
            match pick {
                Some(o) => chosen.push(*o),
                None => break,
            }
        }
        if chosen.len() != occ.len() {
            continue;
        }
        let hi = chosen.iter().map(|o| o.last_word).max().unwrap_or(lo);
        let better = match &best {
            None => true,
            Some((blo, bhi, _)) => (hi - lo, lo) < (bhi - blo, *blo),
        };
        if better {
            best = Some((lo, hi, chosen));
        }
    }
    best
}

/// Trim `span` to a word-aligned window shorter than `max_length` chars that keeps an
/// occurrence of every target.
///
/// Radii are tried from half the word count down to zero and the first (widest) window that
/// fits wins. When even radius zero does not fit, the matched target texts joined by
/// `" ... "` are returned instead. `paragraph` is only used for error reporting.
pub fn window(
    span: &str,
    paragraph: usize,
    targets: &[&Matcher],
    max_length: usize,
) -> Result<Window> {
    let span = textprep::collapse_ws(span);
    let mut word_starts = Vec::new();
    let mut at_start = true;
    for (i, b) in span.bytes().enumerate() {
        if b == b' ' {
            at_start = true;
        } else if at_start {
            word_starts.push(i);
            at_start = false;
        }
    }
    let word_of = |byte: usize| word_starts.partition_point(|&s| s <= byte).saturating_sub(1);

    let mut occ: Vec<Vec<Occurrence>> = Vec::with_capacity(targets.len());
    for m in targets {
        let list: Vec<Occurrence> = m
            .regex
            .find_iter(&span)
            .map(|hit| Occurrence {
                first_word: word_of(hit.start()),
                last_word: word_of(hit.end().saturating_sub(1)),
                start: hit.start(),
                end: hit.end(),
            })
            .collect();
        if list.is_empty() {
            return Err(Error::KeywordNotLocated {
                paragraph,
                keyword: m.keyword.to_string(),
            });
        }
        occ.push(list);
    }

    let words: Vec<&str> = span.split(' ').filter(|w| !w.is_empty()).collect();
    if words.is_empty() {
        return Ok(Window {
            text: String::new(),
            radius: Some(0),
        });
    }
    let (lo, hi, chosen) = covering_span(&occ).unwrap_or((0, 0, Vec::new()));
    let last = words.len() - 1;

    for radius in (0..=words.len().div_ceil(2)).rev() {
        let from = lo.saturating_sub(radius);
        let to = (hi + radius).min(last);
        let text = words[from..=to].join(" ");
        if text.chars().count() < max_length {
            return Ok(Window {
                text,
                radius: Some(radius),
            });
        }
    }

    let mut chosen = chosen;
    chosen.sort_by_key(|o| (o.start, o.end));
    let mut parts: Vec<&str> = Vec::with_capacity(chosen.len());
    for o in &chosen {
        let s = &span[o.start..o.end];
        if !parts.contains(&s) {
            parts.push(s);
        }
    }
    Ok(Window {
        text: parts.join(SEGMENT_SEPARATOR),
        radius: None,
    })
}
