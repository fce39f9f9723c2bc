use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use std::fs::OpenOptions;
use std::io::Write;
use chrono::Local;
use tempfile::NamedTempFile;

// @module: File and directory utilities

/// Suffix of the logical-order output
pub const TRANSLATED_SUFFIX: &str = "_translated";
/// Suffix of the visual-order output
pub const REVERSED_SUFFIX: &str = "_translated_reversed";
/// Suffix of the pre-processing copy
pub const BACKUP_SUFFIX: &str = "_backup";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: `<dir>/<stem><suffix><ext>` next to the input
    pub fn sibling_with_suffix<P: AsRef<Path>>(input_file: P, suffix: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        let mut file_name = format!("{}{}", stem, suffix);
        if let Some(ext) = input_file.extension() {
            file_name.push('.');
            file_name.push_str(&ext.to_string_lossy());
        }

        input_file.with_file_name(file_name)
    }

    /// Whether a path is one of our own outputs, so folder runs skip it
    pub fn is_generated_output<P: AsRef<Path>>(path: P) -> bool {
        let stem = path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        [TRANSLATED_SUFFIX, REVERSED_SUFFIX, BACKUP_SUFFIX]
            .iter()
            .any(|suffix| stem.ends_with(suffix))
    }

    /// Find files with one of the given extensions in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    let ext = ext.to_string_lossy();
                    if extensions.iter().any(|wanted| {
                        ext.eq_ignore_ascii_case(wanted.trim_start_matches('.'))
                    }) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Replace `path` with `bytes` via a temporary file in the same directory
    pub fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> std::io::Result<()> {
        let staged = StagedFile::stage(path.as_ref(), bytes)?;
        staged.commit()
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;

        Ok(())
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Default log file location: `logs/app_<timestamp>.log`
    pub fn default_log_path() -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from("logs").join(format!("app_{}.log", timestamp))
    }
}

/// Output locations derived from an input path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub translated: PathBuf,
    pub reversed: PathBuf,
    pub backup: PathBuf,
}

impl OutputPaths {
    pub fn for_input<P: AsRef<Path>>(input: P) -> Self {
        let input = input.as_ref();
        Self {
            translated: FileManager::sibling_with_suffix(input, TRANSLATED_SUFFIX),
            reversed: FileManager::sibling_with_suffix(input, REVERSED_SUFFIX),
            backup: FileManager::sibling_with_suffix(input, BACKUP_SUFFIX),
        }
    }
}

/// Content written to a temporary file beside its destination.
///
/// Dropping it without `commit` removes the temporary file and leaves the
/// destination untouched.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    destination: PathBuf,
}

impl StagedFile {
    pub fn stage(destination: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;

        Ok(Self {
            temp,
            destination: destination.to_path_buf(),
        })
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Rename into place
    pub fn commit(self) -> std::io::Result<()> {
        self.temp
            .persist(&self.destination)
            .map(|_| ())
            .map_err(|e| e.error)
    }
}
