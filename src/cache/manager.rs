//! File-backed cache store
//!
//! Provides a `CacheManager` that keeps the quote of the day as a single
//! JSON file, supporting graceful degradation when the backend is unavailable.

use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::entry::{CacheEntry, CacheError, CacheStore};

/// File name of the quote-of-the-day slot
const ENTRY_FILE: &str = "quote_of_the_day.json";

/// Scratch file a new entry is written to before it replaces the slot
const TEMP_FILE: &str = "quote_of_the_day.json.tmp";

/// Reads and writes the cached quote of the day on disk
///
/// The cache manager stores the entry as a JSON file in an XDG-compliant
/// cache directory (`~/.cache/quotevault/` on Linux).
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where the cache file is stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "quotevault")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory the cache file lives in
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the cache file
    fn entry_path(&self) -> PathBuf {
        self.cache_dir.join(ENTRY_FILE)
    }

    /// Returns the path of the scratch file used while writing
    fn temp_path(&self) -> PathBuf {
        self.cache_dir.join(TEMP_FILE)
    }
}

impl CacheStore for CacheManager {
    fn read_entry(&self) -> Result<Option<CacheEntry>, CacheError> {
        let content = match fs::read_to_string(self.entry_path()) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(CacheError::Decode)
    }

    fn write_entry(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir)?;

        let json = serde_json::to_string_pretty(entry).map_err(CacheError::Encode)?;

        // Readers see either the old entry or the new one, never a partial file
        let temp_path = self.temp_path();
        fs::write(&temp_path, json)?;
        if let Err(e) = fs::rename(&temp_path, self.entry_path()) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn delete_entry(&self) -> Result<(), CacheError> {
        match fs::remove_file(self.entry_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
