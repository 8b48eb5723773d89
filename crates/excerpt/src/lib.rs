//! Public facade crate for `excerpt`.
//!
//! This crate contains no logic of its own. It re-exports the data model from
//! `excerpt-core` and the snippet pipeline from `excerpt-engine`.

pub use excerpt_core::*;
pub use excerpt_engine::{markup, snippet, HtmlEscaper, NoEscape, SnippetRequest};

pub use excerpt_engine as engine;
