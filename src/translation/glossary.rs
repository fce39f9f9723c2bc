/*!
 * User glossary applied to translatable text before it is sent to a provider.
 *
 * The glossary maps source words to fixed target phrases. Matching is
 * whole-word and case-insensitive; terms are applied one after another in
 * insertion order.
 */

use std::path::{Path, PathBuf};

use log::debug;
use parking_lot::RwLock;
use regex::{NoExpand, Regex};

use crate::errors::PersistenceError;
use super::store::{read_string_map, write_string_map};

/// A single glossary entry with its compiled matcher
#[derive(Debug, Clone)]
pub struct GlossaryTerm {
    /// Normalized (lowercase, trimmed) source word
    pub source: String,
    /// Replacement phrase in the target language
    pub target: String,
    pattern: Regex,
}

impl GlossaryTerm {
    fn new(source: &str, target: &str) -> Option<Self> {
        let source = normalize_key(source);
        if source.is_empty() {
            return None;
        }
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&source))).ok()?;
        Some(Self {
            source,
            target: target.trim().to_string(),
            pattern,
        })
    }
}

/// Ordered set of glossary terms
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    terms: Vec<GlossaryTerm>,
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terms seeded into a freshly created glossary file
    pub fn with_default_terms() -> Self {
        Self::from_pairs([
            ("file", "ملف"),
            ("edit", "تحرير"),
            ("view", "عرض"),
            ("help", "مساعدة"),
            ("settings", "إعدادات"),
            ("save", "حفظ"),
            ("open", "فتح"),
            ("close", "إغلاق"),
            ("new", "جديد"),
            ("delete", "حذف"),
            ("update", "تحديث"),
            ("create", "إنشاء"),
        ])
    }

    /// Build a glossary from pairs, later duplicates overwriting earlier ones
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut glossary = Self::new();
        for (source, target) in pairs {
            glossary.insert(source.as_ref(), target.as_ref());
        }
        glossary
    }

    /// Insert or replace a term. Returns false when the key is blank.
    ///
    /// Replacing keeps the term at its original position.
    pub fn insert(&mut self, source: &str, target: &str) -> bool {
        let Some(term) = GlossaryTerm::new(source, target) else {
            return false;
        };
        match self.terms.iter_mut().find(|t| t.source == term.source) {
            Some(existing) => *existing = term,
            None => self.terms.push(term),
        }
        true
    }

    /// Remove a term; returns whether it existed
    pub fn remove(&mut self, source: &str) -> bool {
        let key = normalize_key(source);
        let before = self.terms.len();
        self.terms.retain(|t| t.source != key);
        self.terms.len() != before
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        let key = normalize_key(source);
        self.terms
            .iter()
            .find(|t| t.source == key)
            .map(|t| t.target.as_str())
    }

    pub fn terms(&self) -> &[GlossaryTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Replace every whole-word occurrence of each term, term by term.
    ///
    /// A later term may match text produced by an earlier replacement.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for term in &self.terms {
            if term.pattern.is_match(&result) {
                result = term
                    .pattern
                    .replace_all(&result, NoExpand(&term.target))
                    .into_owned();
            }
        }
        result
    }
}

/// Normalize a glossary key for storage and comparison
pub fn normalize_key(source: &str) -> String {
    source.trim().to_lowercase()
}

/// Shared, mutable glossary.
///
/// Mutations must be durable before they return.
pub trait GlossaryStore: Send + Sync {
    /// Current terms
    fn snapshot(&self) -> Glossary;

    /// Add or replace a term
    fn add_term(&self, source: &str, target: &str) -> Result<(), PersistenceError>;

    /// Remove a term; returns whether it existed
    fn remove_term(&self, source: &str) -> Result<bool, PersistenceError>;
}

/// Volatile glossary, used by tests
#[derive(Debug, Default)]
pub struct InMemoryGlossaryStore {
    glossary: RwLock<Glossary>,
}

impl InMemoryGlossaryStore {
    pub fn new(glossary: Glossary) -> Self {
        Self { glossary: RwLock::new(glossary) }
    }
}

impl GlossaryStore for InMemoryGlossaryStore {
    fn snapshot(&self) -> Glossary {
        self.glossary.read().clone()
    }

    fn add_term(&self, source: &str, target: &str) -> Result<(), PersistenceError> {
        self.glossary.write().insert(source, target);
        Ok(())
    }

    fn remove_term(&self, source: &str) -> Result<bool, PersistenceError> {
        Ok(self.glossary.write().remove(source))
    }
}

/// Glossary persisted as a JSON object (`{"file": "ملف", ...}`)
#[derive(Debug)]
pub struct JsonGlossaryStore {
    path: PathBuf,
    glossary: RwLock<Glossary>,
}

impl JsonGlossaryStore {
    /// Open the glossary file, seeding it with the default terms if missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let glossary = match read_string_map(&path)? {
            Some(pairs) => Glossary::from_pairs(pairs),
            None => {
                let seeded = Glossary::with_default_terms();
                write_glossary(&path, &seeded)?;
                seeded
            }
        };

        debug!("Loaded {} glossary terms from {:?}", glossary.len(), path);

        Ok(Self {
            path,
            glossary: RwLock::new(glossary),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GlossaryStore for JsonGlossaryStore {
    fn snapshot(&self) -> Glossary {
        self.glossary.read().clone()
    }

    fn add_term(&self, source: &str, target: &str) -> Result<(), PersistenceError> {
        let mut glossary = self.glossary.write();
        let mut updated = glossary.clone();
        if !updated.insert(source, target) {
            return Ok(());
        }
        write_glossary(&self.path, &updated)?;
        *glossary = updated;
        Ok(())
    }

    fn remove_term(&self, source: &str) -> Result<bool, PersistenceError> {
        let mut glossary = self.glossary.write();
        let mut updated = glossary.clone();
        if !updated.remove(source) {
            return Ok(false);
        }
        write_glossary(&self.path, &updated)?;
        *glossary = updated;
        Ok(true)
    }
}

fn write_glossary(path: &Path, glossary: &Glossary) -> Result<(), PersistenceError> {
    write_string_map(path, glossary.terms().iter().map(|t| (&t.source, &t.target)))
}
