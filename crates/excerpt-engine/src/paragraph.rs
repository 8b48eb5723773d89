use crate::textprep;
use excerpt_core::Paragraph;

/// Split raw text into paragraphs on blank lines.
///
/// A line holding only whitespace counts as blank, so `"a\n \nb"` is two paragraphs.
/// Whitespace inside a paragraph collapses to single spaces; empty input yields no paragraphs.
pub fn split(text: &str) -> Vec<Paragraph> {
    let mut out = Vec::new();
    let mut block = String::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut block, &mut out);
            continue;
        }
        block.push_str(line);
        block.push('\n');
    }
    flush(&mut block, &mut out);
    out
}

fn flush(block: &mut String, out: &mut Vec<Paragraph>) {
    let content = textprep::collapse_ws(block);
    block.clear();
    if content.is_empty() {
        return;
    }
    out.push(Paragraph {
        order: out.len(),
        content,
    });
}
