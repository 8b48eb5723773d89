//! Keyword subset scoring for a single paragraph.
//!
//! Every matching keyword weighs `1 + separator_count` of the paragraph, so a match in a
//! longer paragraph counts for more. Non-empty subsets of the matched keywords are
//! enumerated from the full set down to singletons; a subset is recorded at the index equal
//! to its score only when that score exceeds its cardinality, and a later (smaller) subset
//! overwrites an earlier one at the same score.

use crate::textprep::Matcher;
use excerpt_core::{Keyword, Paragraph};
use std::collections::BTreeMap;

/// Bit `i` set means keyword `i` of the request's keyword list.
pub type KeywordMask = u32;

pub fn mask_len(mask: KeywordMask) -> usize {
    mask.count_ones() as usize
}

/// Keywords named by `mask`, sorted so output does not depend on input order.
pub fn mask_keywords(mask: KeywordMask, matchers: &[Matcher]) -> Vec<Keyword> {
    let mut out: Vec<Keyword> = matchers
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << *i) != 0)
        .map(|(_, m)| m.keyword.clone())
        .collect();
    out.sort();
    out
}

/// Sparse map from subset score to the subset last recorded at that score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTable {
    by_score: BTreeMap<u64, KeywordMask>,
}

impl ScoreTable {
    /// Enumerate subsets of the keywords with the given per-keyword weights.
    ///
    /// Only keywords with a non-zero weight take part. A subset padded with zero-weight
    /// keywords scores the same as the subset alone and is always overwritten by it, so
    /// the table equals the one built over all `2^k - 1` subsets.
    pub fn build(weights: &[u64]) -> Self {
        let matched: Vec<usize> = (0..weights.len()).filter(|&i| weights[i] > 0).collect();
        let k = matched.len();
        let mut by_score = BTreeMap::new();
        if k == 0 {
            return Self { by_score };
        }
        let limit: u64 = 1 << k;

        for size in (1..=k).rev() {
            // Gosper's hack: visit every mask with `size` bits set, ascending.
            let mut x: u64 = (1 << size) - 1;
            while x < limit {
                let mut score = 0u64;
                let mut mask: KeywordMask = 0;
                for (j, &i) in matched.iter().enumerate() {
                    if x & (1u64 << j) != 0 {
                        score += weights[i];
                        mask |= (1 as KeywordMask) << i;
                    }
                }
                if score > size as u64 {
                    by_score.insert(score, mask);
                }
                let c = x & x.wrapping_neg();
                let r = x + c;
                x = (((r ^ x) >> 2) / c) | r;
            }
        }
        Self { by_score }
    }

    pub fn get(&self, score: u64) -> Option<KeywordMask> {
        self.by_score.get(&score).copied()
    }

    /// Highest recorded score and its subset.
    pub fn best(&self) -> Option<(u64, KeywordMask)> {
        self.by_score.iter().next_back().map(|(s, m)| (*s, *m))
    }

    pub fn len(&self) -> usize {
        self.by_score.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_score.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ScoredParagraph {
    pub paragraph: Paragraph,
    pub table: ScoreTable,
    /// Highest score in `table`, or 0.
    pub score: u64,
    /// Subset stored at `score`; empty when nothing matched.
    pub best: KeywordMask,
}

/// Per-keyword weight for one paragraph: `1 + separator_count` on a match, else 0.
pub fn match_weights(paragraph: &Paragraph, matchers: &[Matcher]) -> Vec<u64> {
    let weight = 1 + paragraph.separator_count() as u64;
    matchers
        .iter()
        .map(|m| {
            if m.is_match(&paragraph.content) {
                weight
            } else {
                0
            }
        })
        .collect()
}

pub fn score(paragraph: Paragraph, matchers: &[Matcher]) -> ScoredParagraph {
    let table = ScoreTable::build(&match_weights(&paragraph, matchers));
    let (score, best) = table.best().unwrap_or((0, 0));
    tracing::trace!(
        order = paragraph.order,
        score,
        best_keywords = mask_len(best),
        "scored paragraph"
    );
    ScoredParagraph {
        paragraph,
        table,
        score,
        best,
    }
}

pub fn score_all(paragraphs: &[Paragraph], matchers: &[Matcher]) -> Vec<ScoredParagraph> {
    paragraphs
        .iter()
        .cloned()
        .map(|p| score(p, matchers))
        .collect()
}
