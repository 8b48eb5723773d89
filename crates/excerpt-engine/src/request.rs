use crate::assemble::assemble;
use crate::highlight::{self, HtmlEscaper};
use crate::paragraph;
use crate::score;
use crate::select::{self, Selection};
use crate::textprep::{self, Matcher};
use excerpt_core::{
    Delimiters, Error, Escaper, HighlightSpan, Keyword, Paragraph, Result, Snippet,
    SnippetConfig,
};

#[derive(Debug, Clone)]
struct Prepared {
    matchers: Vec<Matcher>,
    selection: Selection,
}

#[derive(Debug, Clone)]
struct Assembled {
    max_length: usize,
    snippet: Option<Snippet>,
    spans: Option<Vec<HighlightSpan>>,
}

/// One document plus the keywords to excerpt it for.
///
/// Results are memoized per stage. Replacing the keywords drops the selection and the
/// assembled snippet; replacing the text drops everything.
#[derive(Debug, Clone)]
pub struct SnippetRequest {
    text: String,
    keywords: Vec<Keyword>,
    config: SnippetConfig,
    paragraphs: Option<Vec<Paragraph>>,
    prepared: Option<Prepared>,
    assembled: Option<Assembled>,
}

impl SnippetRequest {
    pub fn new<I, S>(text: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let config = SnippetConfig::default();
        let keywords = textprep::prepare_keywords(keywords, config.max_keywords);
        Self {
            text: text.into(),
            keywords,
            config,
            paragraphs: None,
            prepared: None,
            assembled: None,
        }
    }

    pub fn with_config<I, S>(
        text: impl Into<String>,
        keywords: I,
        config: SnippetConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        config.validate()?;
        let keywords = textprep::prepare_keywords(keywords, config.max_keywords);
        Ok(Self {
            text: text.into(),
            keywords,
            config,
            paragraphs: None,
            prepared: None,
            assembled: None,
        })
    }

    pub fn source(&self) -> &str {
        &self.text
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn config(&self) -> &SnippetConfig {
        &self.config
    }

    pub fn set_keywords<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = textprep::prepare_keywords(keywords, self.config.max_keywords);
        self.prepared = None;
        self.assembled = None;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.paragraphs = None;
        self.prepared = None;
        self.assembled = None;
    }

    fn max_length(&self, max_length: Option<usize>) -> Result<usize> {
        match max_length {
            Some(0) => Err(Error::InvalidConfig("max_length must be > 0".to_string())),
            Some(n) => Ok(n),
            None => Ok(self.config.max_length),
        }
    }

    fn prepare(&mut self) -> Result<&Prepared> {
        if let Some(p) = self.prepared.take() {
            return Ok(&*self.prepared.insert(p));
        }
        let paragraphs = self
            .paragraphs
            .get_or_insert_with(|| paragraph::split(&self.text));
        let matchers = textprep::matchers(&self.keywords)?;
        let scored = score::score_all(paragraphs, &matchers);
        let selection = select::select(&scored, matchers.len());
        Ok(&*self.prepared.insert(Prepared {
            matchers,
            selection,
        }))
    }

    fn assembled(&mut self, max_length: Option<usize>) -> Result<&mut Assembled> {
        let max_length = self.max_length(max_length)?;
        if let Some(a) = self.assembled.take() {
            if a.max_length == max_length {
                return Ok(self.assembled.insert(a));
            }
        }
        let prepared = self.prepare()?;
        let snippet = assemble(&prepared.selection, &prepared.matchers, max_length)?;
        tracing::debug!(max_length, found = snippet.is_some(), "assembled snippet");
        Ok(self.assembled.insert(Assembled {
            max_length,
            snippet,
            spans: None,
        }))
    }

    /// Paragraphs of the source text, in document order.
    pub fn paragraphs(&mut self) -> &[Paragraph] {
        self.paragraphs
            .get_or_insert_with(|| paragraph::split(&self.text))
    }

    /// The assembled snippet, or `None` when no keyword occurs in the text.
    ///
    /// `max_length` defaults to the configured budget.
    pub fn snippet(&mut self, max_length: Option<usize>) -> Result<Option<&Snippet>> {
        Ok(self.assembled(max_length)?.snippet.as_ref())
    }

    /// Plain-text snippet.
    pub fn plain(&mut self, max_length: Option<usize>) -> Result<Option<String>> {
        Ok(self.snippet(max_length)?.map(|s| s.text.clone()))
    }

    /// Highlighted snippet, HTML-escaped. Delimiters default to the configured ones.
    pub fn markup(
        &mut self,
        max_length: Option<usize>,
        delimiters: Option<&Delimiters>,
    ) -> Result<Option<String>> {
        self.markup_with(max_length, delimiters, &HtmlEscaper)
    }

    pub fn markup_with(
        &mut self,
        max_length: Option<usize>,
        delimiters: Option<&Delimiters>,
        escaper: &dyn Escaper,
    ) -> Result<Option<String>> {
        let delimiters = delimiters.cloned().unwrap_or_else(|| self.config.delimiters.clone());
        match self.snippet(max_length)? {
            Some(s) => highlight::render(s, &delimiters, escaper).map(Some),
            None => Ok(None),
        }
    }

    /// Keyword offsets into the plain-text snippet.
    pub fn highlights(&mut self, max_length: Option<usize>) -> Result<Option<Vec<HighlightSpan>>> {
        let a = self.assembled(max_length)?;
        let Some(snippet) = &a.snippet else {
            return Ok(None);
        };
        if a.spans.is_none() {
            a.spans = Some(highlight::spans(snippet)?);
        }
        Ok(a.spans.clone())
    }

    /// Keywords that no selected paragraph covers.
    pub fn uncovered(&mut self) -> Result<Vec<Keyword>> {
        let p = self.prepare()?;
        Ok(score::mask_keywords(p.selection.uncovered, &p.matchers))
    }
}

/// One-shot plain-text snippet.
pub fn snippet<I, S>(text: &str, keywords: I, max_length: usize) -> Result<Option<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    SnippetRequest::new(text, keywords).plain(Some(max_length))
}

/// One-shot HTML-escaped highlighted snippet.
pub fn markup<I, S>(
    text: &str,
    keywords: I,
    max_length: usize,
    delimiters: &Delimiters,
) -> Result<Option<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    SnippetRequest::new(text, keywords).markup(Some(max_length), Some(delimiters))
}
