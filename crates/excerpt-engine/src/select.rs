use crate::score::{mask_len, KeywordMask, ScoredParagraph};
use excerpt_core::Paragraph;

/// A selected paragraph and the keywords it is responsible for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub paragraph: Paragraph,
    pub score: u64,
    /// Non-empty; disjoint from every other pick's `assigned`.
    pub assigned: KeywordMask,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Picks in document order.
    pub picks: Vec<Pick>,
    /// Keywords no selected paragraph covers.
    pub uncovered: KeywordMask,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
}

/// Greedy subset cover over scored paragraphs.
///
/// Paragraphs are visited by descending score (document order among equal scores); each
/// takes the still-uncovered part of its best subset. Stops once every keyword is covered.
pub fn select(scored: &[ScoredParagraph], keyword_count: usize) -> Selection {
    let mut uncovered: KeywordMask = if keyword_count >= KeywordMask::BITS as usize {
        KeywordMask::MAX
    } else {
        (1 << keyword_count) - 1
    };

    let mut order: Vec<&ScoredParagraph> = scored.iter().collect();
    order.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.paragraph.order.cmp(&b.paragraph.order))
    });

    let mut picks = Vec::new();
    for sp in order {
        if uncovered == 0 {
            break;
        }
        let assigned = sp.best & uncovered;
        if assigned == 0 {
            continue;
        }
        uncovered &= !assigned;
        picks.push(Pick {
            paragraph: sp.paragraph.clone(),
            score: sp.score,
            assigned,
        });
    }

    picks.sort_by_key(|p| p.paragraph.order);
    tracing::debug!(
        paragraphs = scored.len(),
        selected = picks.len(),
        uncovered = mask_len(uncovered),
        "selected paragraphs"
    );
    Selection { picks, uncovered }
}
