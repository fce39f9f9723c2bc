/*!
 * Display preparation for right-to-left scripts.
 *
 * Renderers that only lay text out left-to-right (game engines, legacy UI
 * toolkits) show Arabic as disconnected letters in reverse order. This module
 * converts translated text into presentation forms and visual order so it
 * displays correctly there. Protected tokens are shielded from both steps.
 */

use std::ops::RangeInclusive;

use ar_reshaper::ArabicReshaper;
use unicode_bidi::BidiInfo;
use unicode_bidi_mirroring::get_mirrored;

use crate::language_utils::normalize_to_part2t;
use super::segmenter::{segment, Span, SpanKind};

/// Right-to-left script families with a designated code range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtlScript {
    Arabic,
    Hebrew,
}

impl RtlScript {
    /// Characters whose presence triggers reshaping
    pub fn code_range(&self) -> RangeInclusive<char> {
        match self {
            Self::Arabic => '\u{0600}'..='\u{06FF}',
            Self::Hebrew => '\u{0590}'..='\u{05FF}',
        }
    }

    /// Whether letters take contextual joining forms
    pub fn joins_cursively(&self) -> bool {
        matches!(self, Self::Arabic)
    }

    /// Script written by the given language, if it is right-to-left.
    ///
    /// Accepts any ISO 639-1 or 639-2 form of the code.
    pub fn for_language(code: &str) -> Option<Self> {
        let code = normalize_to_part2t(code).ok()?;
        match code.as_str() {
            "ara" | "fas" | "urd" | "pus" | "kur" | "snd" | "uig" => Some(Self::Arabic),
            "heb" | "yid" => Some(Self::Hebrew),
            _ => None,
        }
    }
}

/// Reshapes and reorders translated text for display
pub struct BidiReshaper {
    script: RtlScript,
    reshaper: ArabicReshaper,
}

impl std::fmt::Debug for BidiReshaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BidiReshaper").field("script", &self.script).finish()
    }
}

impl BidiReshaper {
    pub fn new(script: RtlScript) -> Self {
        Self {
            script,
            reshaper: ArabicReshaper::default(),
        }
    }

    pub fn script(&self) -> RtlScript {
        self.script
    }

    /// Whether `text` contains a character of the target script
    pub fn applies_to(&self, text: &str) -> bool {
        let range = self.script.code_range();
        text.chars().any(|c| range.contains(&c))
    }

    /// Convert logical-order text into shaped, visual-order text.
    ///
    /// Not idempotent: apply once, at output time.
    pub fn reshape_for_display(&self, text: &str) -> String {
        if !self.applies_to(text) {
            return text.to_string();
        }

        segment(text)
            .into_iter()
            .map(|span| match span.kind {
                SpanKind::Protected => span.text,
                SpanKind::Translatable => self.reshape_span(&span),
            })
            .collect()
    }

    fn reshape_span(&self, span: &Span) -> String {
        let shaped = if self.script.joins_cursively() {
            self.reshaper.reshape(&span.text)
        } else {
            span.text.clone()
        };
        visual_order(&shaped)
    }
}

/// Reorder each paragraph of `text` into visual order.
///
/// Characters in right-to-left runs are replaced by their mirrored glyph
/// (`(` and `)`, `«` and `»`, `<` and `>`) as the reversal alone would show
/// them facing the wrong way.
fn visual_order(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let bidi_info = BidiInfo::new(text, None);
    let mut result = String::with_capacity(text.len());
    for paragraph in &bidi_info.paragraphs {
        let line = paragraph.range.clone();
        let (levels, runs) = bidi_info.visual_runs(paragraph, line);
        for run in runs {
            let run_text = &text[run.clone()];
            if levels[run.start].is_rtl() {
                result.extend(run_text.chars().rev().map(mirror));
            } else {
                result.push_str(run_text);
            }
        }
    }
    result
}

fn mirror(c: char) -> char {
    get_mirrored(c).unwrap_or(c)
}
