/*!
 * Segmentation of raw text into protected and translatable spans.
 *
 * Localization strings embed script calls, variables and markup that must
 * survive translation byte-for-byte. The segmenter finds these tokens and
 * splits the text around them so that only natural language reaches the
 * translation provider.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Function-call forms that are always left untouched
pub const PROTECTED_FUNCTIONS: &[&str] = &["GetTrait", "GetFaith", "GetReligion"];

/// Alternation of every protected form, in priority order.
///
/// Each arm is lazy so a token stops at its first closing marker. `.` does
/// not match a line break, so an unterminated opener never swallows the
/// following lines.
static PROTECTED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let functions = PROTECTED_FUNCTIONS
        .iter()
        .map(|name| format!(r"{}\(.*?\)", regex::escape(name)))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(
        r"\$.*?\$|\[.*?\]|@.*?!|#.*?#!|\|.*?\||{}|\(.*?\)|\{{.*?\}}",
        functions
    ))
    .expect("protected token pattern is valid")
});

/// Kind of a span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Placeholder, script call or markup; passes through unchanged
    Protected,
    /// Natural language eligible for translation
    Translatable,
}

/// A contiguous piece of the input text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub text: String,
}

impl Span {
    pub fn protected(text: impl Into<String>) -> Self {
        Self { kind: SpanKind::Protected, text: text.into() }
    }

    pub fn translatable(text: impl Into<String>) -> Self {
        Self { kind: SpanKind::Translatable, text: text.into() }
    }

    pub fn is_protected(&self) -> bool {
        self.kind == SpanKind::Protected
    }
}

/// Split `text` into ordered spans.
///
/// The split is total and lossless: joining the span texts yields `text`.
/// Empty spans are never produced.
pub fn segment(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for token in PROTECTED_PATTERN.find_iter(text) {
        if token.start() > cursor {
            spans.push(Span::translatable(&text[cursor..token.start()]));
        }
        if !token.as_str().is_empty() {
            spans.push(Span::protected(token.as_str()));
        }
        cursor = token.end();
    }

    if cursor < text.len() {
        spans.push(Span::translatable(&text[cursor..]));
    }

    spans
}

/// Join spans back into a single string
pub fn reassemble(spans: &[Span]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}

/// Whether `text` contains at least one protected token
pub fn contains_protected(text: &str) -> bool {
    PROTECTED_PATTERN.is_match(text)
}

/// Split a span into its leading whitespace, trimmed core and trailing whitespace
pub fn split_whitespace_bounds(text: &str) -> (&str, &str, &str) {
    let core_start = text.len() - text.trim_start().len();
    let core_end = text.trim_end().len();
    if core_start >= core_end {
        return (text, "", "");
    }
    (&text[..core_start], &text[core_start..core_end], &text[core_end..])
}
