use crate::score::mask_keywords;
use crate::select::Selection;
use crate::textprep::Matcher;
use crate::window;
use excerpt_core::{Result, Snippet, SnippetSegment};

/// Trim every pick to an equal share of `max_length` and join them in document order.
///
/// `None` when the selection is empty.
pub fn assemble(
    selection: &Selection,
    matchers: &[Matcher],
    max_length: usize,
) -> Result<Option<Snippet>> {
    if selection.is_empty() {
        return Ok(None);
    }
    let share = max_length / selection.picks.len();

    let mut segments = Vec::with_capacity(selection.picks.len());
    for pick in &selection.picks {
        let targets: Vec<&Matcher> = matchers
            .iter()
            .enumerate()
            .filter(|(i, _)| pick.assigned & (1 << *i) != 0)
            .map(|(_, m)| m)
            .collect();
        let w = window::window(&pick.paragraph.content, pick.paragraph.order, &targets, share)?;
        if w.is_fallback() {
            tracing::debug!(
                order = pick.paragraph.order,
                share,
                "no context window fits; keeping keywords only"
            );
        }
        segments.push(SnippetSegment {
            order: pick.paragraph.order,
            fallback: w.is_fallback(),
            text: w.text,
            keywords: mask_keywords(pick.assigned, matchers),
        });
    }
    Ok(Some(Snippet::from_segments(segments)))
}
