/*!
 * Translation memory.
 *
 * This module provides the persistent cache of previous translations that is
 * consulted before every provider call and updated after it, so the same
 * source text is never sent to a provider twice.
 */

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use parking_lot::RwLock;

use crate::errors::PersistenceError;
use super::store::{read_string_map, write_string_map};

/// Source text -> translated text store.
///
/// Keys and values are trimmed on the way in. `store` and `clear` must be
/// durable before they return.
pub trait TranslationMemory: Send + Sync {
    /// Look up a previous translation; never calls a provider
    fn lookup(&self, source_text: &str) -> Option<String>;

    /// Record a translation, replacing any previous one for the same source
    fn store(&self, source_text: &str, translated_text: &str) -> Result<(), PersistenceError>;

    /// Drop every entry
    fn clear(&self) -> Result<(), PersistenceError>;

    /// All entries, ordered by source text
    fn entries(&self) -> Vec<(String, String)>;

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries whose source or translation contains `needle`, ignoring case
    fn search(&self, needle: &str) -> Vec<(String, String)> {
        let needle = needle.trim().to_lowercase();
        self.entries()
            .into_iter()
            .filter(|(source, target)| {
                source.to_lowercase().contains(&needle) || target.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

/// Hit and miss counters shared by the memory implementations
#[derive(Debug, Default)]
struct CacheStats {
    hits: usize,
    misses: usize,
}

impl CacheStats {
    fn record(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    fn snapshot(&self) -> (usize, usize, f64) {
        let total = self.hits + self.misses;
        let hit_rate = if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        };
        (self.hits, self.misses, hit_rate)
    }
}

/// Volatile memory, used by tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryTranslationMemory {
    entries: RwLock<BTreeMap<String, String>>,
    stats: RwLock<CacheStats>,
}

impl InMemoryTranslationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        self.stats.read().snapshot()
    }
}

impl TranslationMemory for InMemoryTranslationMemory {
    fn lookup(&self, source_text: &str) -> Option<String> {
        let found = self.entries.read().get(source_text.trim()).cloned();
        self.stats.write().record(found.is_some());
        found
    }

    fn store(&self, source_text: &str, translated_text: &str) -> Result<(), PersistenceError> {
        self.entries
            .write()
            .insert(source_text.trim().to_string(), translated_text.trim().to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        self.entries.write().clear();
        Ok(())
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.entries.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// Memory persisted as a JSON object on disk.
///
/// The file is read once when opened; each mutation updates the in-memory
/// copy and rewrites the whole file before returning.
#[derive(Debug)]
pub struct JsonTranslationMemory {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
    stats: RwLock<CacheStats>,
}

impl JsonTranslationMemory {
    /// Open the memory file, creating an empty one if it does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let entries = match read_string_map(&path)? {
            Some(pairs) => pairs.into_iter().collect(),
            None => {
                let empty = BTreeMap::new();
                write_string_map(&path, &empty)?;
                empty
            }
        };

        debug!("Loaded {} translation memory entries from {:?}", entries.len(), path);

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            stats: RwLock::new(CacheStats::default()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        self.stats.read().snapshot()
    }
}

impl TranslationMemory for JsonTranslationMemory {
    fn lookup(&self, source_text: &str) -> Option<String> {
        let found = self.entries.read().get(source_text.trim()).cloned();
        self.stats.write().record(found.is_some());
        if found.is_some() {
            debug!("Memory hit for '{}'", truncate_text(source_text.trim(), 30));
        }
        found
    }

    fn store(&self, source_text: &str, translated_text: &str) -> Result<(), PersistenceError> {
        // Hold the write lock across the rewrite so stores are serialized
        let mut entries = self.entries.write();
        let key = source_text.trim().to_string();
        let previous = entries.insert(key.clone(), translated_text.trim().to_string());
        if let Err(e) = write_string_map(&self.path, entries.iter()) {
            match previous {
                Some(value) => entries.insert(key, value),
                None => entries.remove(&key),
            };
            return Err(e);
        }

        debug!("Stored translation for '{}'", truncate_text(source_text.trim(), 30));
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        let mut entries = self.entries.write();
        write_string_map(&self.path, std::iter::empty())?;
        entries.clear();
        debug!("Translation memory cleared");
        Ok(())
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.entries.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// Truncate text to a maximum number of characters with ellipsis
fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}
