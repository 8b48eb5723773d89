//! Snippet extraction: split a document into paragraphs, score them against the search
//! keywords, greedily pick a small covering set, trim each pick to its share of the length
//! budget, and render keyword highlights.
//!
//! The pipeline is synchronous and keeps no state between requests; [`SnippetRequest`]
//! memoizes intermediate stages for a single document.

pub mod assemble;
pub mod highlight;
pub mod paragraph;
pub mod request;
pub mod score;
pub mod select;
pub mod textprep;
pub mod window;

pub use highlight::{HtmlEscaper, NoEscape};
pub use request::{markup, snippet, SnippetRequest};

#[cfg(test)]
mod tests {
    use super::*;
    use excerpt_core::{Delimiters, SEGMENT_SEPARATOR};
    use proptest::prelude::*;

    const DOC: &str = "The committee met on Tuesday to discuss the budget.\n\n\
                       After a long debate they decided to bite the bullet and raise fees.\n\n\
                       Rust is a systems language; Haskell is a functional language.\n\n\
                       Weather was mild and nobody complained about the bullet points.";

    const VOCAB: &[&str] = &[
        "bite", "bullet", "budget", "haskell", "rust", "weather", "zebra", "functional language",
    ];

    fn keywords() -> impl Strategy<Value = Vec<String>> {
        prop::sample::subsequence(VOCAB.to_vec(), 1..=5)
            .prop_map(|v| v.into_iter().map(str::to_string).collect())
    }

    proptest! {
        #[test]
        fn keyword_order_never_changes_output(ks in keywords(), seed in any::<u64>()) {
            let mut shuffled = ks.clone();
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            shuffled.reverse();

            let mut a = SnippetRequest::new(DOC, &ks);
            let mut b = SnippetRequest::new(DOC, &shuffled);
            prop_assert_eq!(a.plain(None).unwrap(), b.plain(None).unwrap());
            prop_assert_eq!(a.markup(None, None).unwrap(), b.markup(None, None).unwrap());
        }

        #[test]
        fn keyword_case_never_changes_output(ks in keywords()) {
            let upper: Vec<String> = ks.iter().map(|k| k.to_uppercase()).collect();
            let mut a = SnippetRequest::new(DOC, &ks);
            let mut b = SnippetRequest::new(DOC, &upper);
            prop_assert_eq!(a.markup(None, None).unwrap(), b.markup(None, None).unwrap());
        }

        #[test]
        fn repeated_queries_are_stable(ks in keywords(), max_length in 10usize..200) {
            let mut r = SnippetRequest::new(DOC, &ks);
            let first = r.plain(Some(max_length)).unwrap();
            let marked = r.markup(Some(max_length), None).unwrap();
            prop_assert_eq!(first, r.plain(Some(max_length)).unwrap());
            prop_assert_eq!(marked, r.markup(Some(max_length), None).unwrap());
        }

        #[test]
        fn segments_respect_their_share(ks in keywords(), max_length in 10usize..200) {
            let mut r = SnippetRequest::new(DOC, &ks);
            if let Some(s) = r.snippet(Some(max_length)).unwrap() {
                let share = max_length / s.segments.len();
                for seg in &s.segments {
                    prop_assert!(seg.fallback || seg.text.chars().count() < share);
                }
            }
        }

        #[test]
        fn assigned_keywords_appear_in_plain_text(ks in keywords(), max_length in 10usize..200) {
            let mut r = SnippetRequest::new(DOC, &ks);
            if let Some(s) = r.snippet(Some(max_length)).unwrap() {
                let lower = s.text.to_lowercase();
                for k in s.covered() {
                    prop_assert!(lower.contains(k.as_str()), "{} missing from {:?}", k, s.text);
                }
            }
        }
    }

    #[test]
    fn absent_keywords_yield_no_snippet() {
        assert_eq!(snippet(DOC, ["zebra", "giraffe"], 80).unwrap(), None);
        assert_eq!(
            markup(DOC, ["zebra"], 80, &Delimiters::default()).unwrap(),
            None
        );
    }

    #[test]
    fn distant_keywords_come_from_separate_paragraphs() {
        let out = snippet(DOC, ["budget", "haskell"], 80).unwrap().unwrap();
        assert_eq!(out.matches(SEGMENT_SEPARATOR).count(), 1);
        let (first, second) = out.split_once(SEGMENT_SEPARATOR).unwrap();
        assert!(first.contains("budget"));
        assert!(second.contains("Haskell"));
    }

    #[test]
    fn one_word_paragraph_is_never_selected() {
        // A lone word weighs 1, which never exceeds the cardinality of its subset.
        assert_eq!(snippet("Haskell\n\nsomething else", ["haskell"], 80).unwrap(), None);
        let out = snippet("Haskell\n\nwe like Haskell", ["haskell"], 80).unwrap();
        assert_eq!(out.as_deref(), Some("we like Haskell"));
    }

    #[test]
    fn longer_paragraph_wins_for_the_same_keyword() {
        let text = "short bullet\n\na considerably longer paragraph that also mentions a bullet";
        let mut r = SnippetRequest::new(text, ["bullet"]);
        let s = r.snippet(Some(200)).unwrap().unwrap();
        assert_eq!(s.segments.len(), 1);
        assert_eq!(s.segments[0].order, 1);
    }
}
