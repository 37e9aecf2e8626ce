//! Cache entry type and the storage trait it is persisted through

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Quote;

/// Errors that can occur when reading or writing the cache slot
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading, writing or removing the backing file failed
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored entry could not be decoded
    #[error("Cache entry is corrupt: {0}")]
    Decode(#[source] serde_json::Error),

    /// The entry could not be encoded
    #[error("Failed to encode cache entry: {0}")]
    Encode(#[source] serde_json::Error),

    /// The backing store is not usable for some other reason
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// The persisted quote-of-the-day record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Snapshot of the quote as fetched
    pub quote: Quote,
    /// Day of the year (1-366) the quote was fetched for
    pub day_key: u32,
    /// When the entry was written
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry for `quote` fetched on `day_key`, stamped with the current time
    pub fn new(quote: Quote, day_key: u32) -> Self {
        Self {
            quote,
            day_key,
            cached_at: Utc::now(),
        }
    }

    /// Whether this entry was fetched for `today`
    pub fn is_for_day(&self, today: u32) -> bool {
        self.day_key == today
    }
}

/// A persisted single-slot store for the quote of the day
///
/// Implementations only need whatever atomicity their backing storage
/// gives a single key; callers do not lock around read-then-write.
pub trait CacheStore: Send + Sync {
    /// Reads the stored entry
    ///
    /// # Returns
    /// * `Ok(Some(CacheEntry))` if an entry is stored
    /// * `Ok(None)` if the slot is empty
    /// * `Err(CacheError)` if the slot exists but cannot be read or decoded
    fn read_entry(&self) -> Result<Option<CacheEntry>, CacheError>;

    /// Stores `entry`, replacing any previous one
    fn write_entry(&self, entry: &CacheEntry) -> Result<(), CacheError>;

    /// Removes the stored entry; an empty slot is not an error
    fn delete_entry(&self) -> Result<(), CacheError>;
}
