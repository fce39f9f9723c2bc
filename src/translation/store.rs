/*!
 * Flat JSON key/value files backing the glossary and the translation memory.
 *
 * Both stores are human-editable JSON objects mapping strings to strings.
 * Every mutation rewrites the whole file through a temporary file that is
 * renamed into place, so a completed write is never observed half-done.
 */

use std::path::Path;

use serde_json::{Map, Value};

use crate::errors::PersistenceError;
use crate::file_utils::FileManager;

/// Read a JSON object of strings, preserving the key order of the file.
///
/// A missing file reads as `None`; an empty file reads as an empty map.
pub fn read_string_map(path: &Path) -> Result<Option<Vec<(String, String)>>, PersistenceError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Ok(Some(Vec::new()));
    }

    let object: Map<String, Value> =
        serde_json::from_str(content).map_err(|e| PersistenceError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut pairs = Vec::with_capacity(object.len());
    for (key, value) in object {
        match value {
            Value::String(text) => pairs.push((key, text)),
            other => {
                return Err(PersistenceError::Corrupt {
                    path: path.to_path_buf(),
                    message: format!("value for '{}' is not a string: {}", key, other),
                });
            }
        }
    }
    Ok(Some(pairs))
}

/// Rewrite the file with the given pairs as a pretty-printed JSON object
pub fn write_string_map<'a, I>(path: &Path, pairs: I) -> Result<(), PersistenceError>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let object: Map<String, Value> = pairs
        .into_iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    let json = serde_json::to_string_pretty(&Value::Object(object)).map_err(|e| {
        PersistenceError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    FileManager::write_atomic(path, json.as_bytes()).map_err(|source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })
}
