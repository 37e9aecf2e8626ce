//! Cache module for persisting the quote of the day to disk
//!
//! The cache holds a single slot: the last quote successfully fetched,
//! tagged with the day of the year it was fetched for. Old entries are
//! never expired by time; they are kept until overwritten or cleared so
//! that a stale quote can still be served when the backend is unreachable.

mod entry;
mod manager;

pub use entry::{CacheEntry, CacheError, CacheStore};
pub use manager::CacheManager;
