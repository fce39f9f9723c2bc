/*!
 * Post-editing of provider output.
 *
 * Machine translation into Arabic frequently drops hamza and confuses final
 * ya/alif maqsura. A fixed table of whole-word corrections is applied to the
 * translated text.
 */

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

/// Commonly mistyped word -> corrected word
pub const CORRECTIONS: &[(&str, &str)] = &[
    ("انشاء", "إنشاء"),
    ("الذى", "الذي"),
    ("فى", "في"),
    ("الى", "إلى"),
    ("علي", "على"),
];

static CORRECTION_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    CORRECTIONS
        .iter()
        .map(|(wrong, right)| {
            let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(wrong)))
                .expect("correction pattern is valid");
            (pattern, *right)
        })
        .collect()
});

/// Applies the correction table
#[derive(Debug, Clone, Copy, Default)]
pub struct PostEditor;

impl PostEditor {
    pub fn new() -> Self {
        Self
    }

    /// Apply every correction as a whole-word, case-sensitive substitution
    pub fn correct(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (pattern, right) in CORRECTION_PATTERNS.iter() {
            if pattern.is_match(&result) {
                result = pattern.replace_all(&result, NoExpand(right)).into_owned();
            }
        }
        result
    }
}
