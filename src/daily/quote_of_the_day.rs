//! Day-keyed read-through cache for the quote of the day
//!
//! `DailyQuoteCache` sits in front of a [`QuoteSource`] and a [`CacheStore`]:
//! - a stored entry whose day matches today is returned without a fetch
//! - otherwise the source is asked and a successful result is stored
//! - if the fetch fails, the stored entry is returned however old it is
//!
//! Storage problems never block serving a quote. A failed read counts as a
//! cache miss and a failed write is only logged.

use serde::Serialize;
use thiserror::Error;

use super::clock::{DayClock, LocalDayClock};
use crate::cache::{CacheEntry, CacheManager, CacheStore};
use crate::data::{Quote, QuoteSource, SourceError};

/// Errors surfaced by [`DailyQuoteCache::get_quote_of_the_day`]
#[derive(Debug, Error)]
pub enum DailyQuoteError {
    /// The source failed and nothing was cached to fall back to
    #[error("No quote of the day available: {source}")]
    NoFallbackAvailable {
        #[source]
        source: SourceError,
    },
}

/// Where a served quote came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// Stored entry for today; no fetch was made
    Cached,
    /// Fetched from the source during this call
    Fetched,
    /// Stored entry from an earlier day, served because the fetch failed
    Stale,
}

/// A quote of the day together with how it was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuote {
    /// The quote
    pub quote: Quote,
    /// Whether it was cached, fetched, or a stale fallback
    pub freshness: Freshness,
    /// Day of the year the quote was fetched for
    pub day_key: u32,
}

impl DailyQuote {
    fn from_entry(entry: CacheEntry, freshness: Freshness) -> Self {
        Self {
            quote: entry.quote,
            freshness,
            day_key: entry.day_key,
        }
    }

    /// Whether this quote may belong to an earlier day
    pub fn is_stale(&self) -> bool {
        self.freshness == Freshness::Stale
    }
}

/// Serves the quote of the day with at most one fetch per calendar day
///
/// No lock is held around the check-fetch-store sequence. Callers racing on
/// a cold cache may each fetch, and the last write wins. Dropping the future
/// while the fetch is pending leaves the stored entry untouched.
#[derive(Debug)]
pub struct DailyQuoteCache<S, C = CacheManager, K = LocalDayClock> {
    source: S,
    store: C,
    clock: K,
}

impl<S, C> DailyQuoteCache<S, C, LocalDayClock>
where
    S: QuoteSource,
    C: CacheStore,
{
    /// Creates a cache that uses the local calendar for "today"
    pub fn new(source: S, store: C) -> Self {
        Self::with_clock(source, store, LocalDayClock)
    }
}

impl<S, C, K> DailyQuoteCache<S, C, K>
where
    S: QuoteSource,
    C: CacheStore,
    K: DayClock,
{
    /// Creates a cache with an explicit clock
    pub fn with_clock(source: S, store: C, clock: K) -> Self {
        Self {
            source,
            store,
            clock,
        }
    }

    /// Returns today's quote, fetching it at most once per day
    ///
    /// # Returns
    /// * `Ok(DailyQuote)` with `Freshness::Cached` if today's quote was stored
    /// * `Ok(DailyQuote)` with `Freshness::Fetched` after a successful fetch
    /// * `Ok(DailyQuote)` with `Freshness::Stale` if the fetch failed but an
    ///   older quote was stored
    /// * `Err(DailyQuoteError::NoFallbackAvailable)` if the fetch failed and
    ///   nothing was stored
    pub async fn get_quote_of_the_day(&self) -> Result<DailyQuote, DailyQuoteError> {
        let today = self.clock.day_of_year();

        let (cached, read_failed) = match self.store.read_entry() {
            Ok(entry) => (entry, false),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cached quote of the day");
                (None, true)
            }
        };

        let cached = match cached {
            Some(entry) if entry.is_for_day(today) => {
                tracing::debug!(day = today, "Returning cached quote of the day");
                return Ok(DailyQuote::from_entry(entry, Freshness::Cached));
            }
            other => other,
        };

        tracing::debug!(day = today, "Cache miss, fetching quote of the day");

        match self.source.fetch_quote_of_the_day().await {
            Ok(quote) => {
                let entry = CacheEntry::new(quote, today);
                match self.store.write_entry(&entry) {
                    Ok(()) => tracing::debug!(day = today, "Cached quote of the day"),
                    Err(e) => tracing::warn!(error = %e, "Failed to cache quote of the day"),
                }
                Ok(DailyQuote::from_entry(entry, Freshness::Fetched))
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to fetch quote of the day");

                // The first read may have hit a transient error; give the
                // store one more chance before giving up.
                let fallback = if read_failed {
                    self.store.read_entry().ok().flatten()
                } else {
                    cached
                };

                match fallback {
                    Some(entry) => {
                        tracing::warn!(
                            day = today,
                            cached_day = entry.day_key,
                            "Using cached quote of the day after fetch error"
                        );
                        let freshness = if entry.is_for_day(today) {
                            Freshness::Cached
                        } else {
                            Freshness::Stale
                        };
                        Ok(DailyQuote::from_entry(entry, freshness))
                    }
                    None => Err(DailyQuoteError::NoFallbackAvailable { source: error }),
                }
            }
        }
    }

    /// Removes the stored quote so the next call fetches again
    ///
    /// Clearing an empty cache is a no-op. Storage errors are logged.
    pub fn clear_cache(&self) {
        match self.store.delete_entry() {
            Ok(()) => tracing::debug!("Quote of the day cache cleared"),
            Err(e) => tracing::warn!(error = %e, "Failed to clear quote of the day cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheError;
    use crate::data::QuoteCategory;
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn quote(id: &str) -> Quote {
        Quote {
            id: id.to_string(),
            text: format!("Quote {}", id),
            author: "Author".to_string(),
            category: QuoteCategory::General,
            created_at: 0,
            is_favorite: false,
        }
    }

    /// Source whose next answer can be changed from the test
    #[derive(Clone)]
    struct FakeSource {
        calls: Arc<AtomicUsize>,
        next: Arc<Mutex<Result<Quote, String>>>,
    }

    impl FakeSource {
        fn returning(quote: Quote) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                next: Arc::new(Mutex::new(Ok(quote))),
            }
        }

        fn failing() -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                next: Arc::new(Mutex::new(Err("offline".to_string()))),
            }
        }

        fn set(&self, next: Result<Quote, String>) {
            *self.next.lock().unwrap() = next;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl QuoteSource for FakeSource {
        async fn fetch_quote_of_the_day(&self) -> Result<Quote, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.next.lock().unwrap().clone();
            next.map_err(SourceError::Unavailable)
        }
    }

    /// Source that never answers
    struct PendingSource;

    impl QuoteSource for PendingSource {
        async fn fetch_quote_of_the_day(&self) -> Result<Quote, SourceError> {
            std::future::pending().await
        }
    }

    /// In-memory store with switchable failures
    #[derive(Clone, Default)]
    struct MemoryStore {
        slot: Arc<Mutex<Option<CacheEntry>>>,
        failing_reads: Arc<AtomicUsize>,
        fail_writes: Arc<AtomicBool>,
    }

    impl MemoryStore {
        fn entry(&self) -> Option<CacheEntry> {
            self.slot.lock().unwrap().clone()
        }
    }

    impl CacheStore for MemoryStore {
        fn read_entry(&self) -> Result<Option<CacheEntry>, CacheError> {
            let remaining = self.failing_reads.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failing_reads.store(remaining - 1, Ordering::SeqCst);
                return Err(CacheError::Unavailable("read failed".to_string()));
            }
            Ok(self.entry())
        }

        fn write_entry(&self, entry: &CacheEntry) -> Result<(), CacheError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(CacheError::Unavailable("write failed".to_string()));
            }
            *self.slot.lock().unwrap() = Some(entry.clone());
            Ok(())
        }

        fn delete_entry(&self) -> Result<(), CacheError> {
            *self.slot.lock().unwrap() = None;
            Ok(())
        }
    }

    /// Clock pinned to a day the test can move
    #[derive(Clone)]
    struct FixedDay(Arc<AtomicU32>);

    impl FixedDay {
        fn new(day: u32) -> Self {
            Self(Arc::new(AtomicU32::new(day)))
        }

        fn set(&self, day: u32) {
            self.0.store(day, Ordering::SeqCst);
        }
    }

    impl DayClock for FixedDay {
        fn day_of_year(&self) -> u32 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn build(
        source: &FakeSource,
        store: &MemoryStore,
        day: &FixedDay,
    ) -> DailyQuoteCache<FakeSource, MemoryStore, FixedDay> {
        DailyQuoteCache::with_clock(source.clone(), store.clone(), day.clone())
    }

    #[tokio::test]
    async fn test_same_day_calls_fetch_once() {
        let source = FakeSource::returning(quote("q1"));
        let store = MemoryStore::default();
        let day = FixedDay::new(45);
        let cache = build(&source, &store, &day);

        let first = cache.get_quote_of_the_day().await.expect("First call should succeed");
        assert_eq!(first.freshness, Freshness::Fetched);

        for _ in 0..4 {
            let again = cache.get_quote_of_the_day().await.expect("Cached call should succeed");
            assert_eq!(again.quote, first.quote);
            assert_eq!(again.freshness, Freshness::Cached);
        }

        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_day_rollover_triggers_refetch() {
        let source = FakeSource::returning(quote("q1"));
        let store = MemoryStore::default();
        let day = FixedDay::new(45);
        let cache = build(&source, &store, &day);

        cache.get_quote_of_the_day().await.unwrap();
        day.set(46);
        source.set(Ok(quote("q2")));

        let result = cache.get_quote_of_the_day().await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(result.quote.id, "q2");
        assert_eq!(result.day_key, 46);
        assert_eq!(store.entry().unwrap().day_key, 46);
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_stale_entry() {
        let source = FakeSource::returning(quote("q1"));
        let store = MemoryStore::default();
        let day = FixedDay::new(45);
        let cache = build(&source, &store, &day);

        cache.get_quote_of_the_day().await.unwrap();
        day.set(50);
        source.set(Err("backend down".to_string()));

        let result = cache.get_quote_of_the_day().await.expect("Should fall back");

        assert_eq!(result.quote.id, "q1");
        assert!(result.is_stale());
        assert_eq!(result.day_key, 45);
        assert_eq!(source.calls(), 2);
        // Fallback does not rewrite the entry
        assert_eq!(store.entry().unwrap().day_key, 45);
    }

    #[tokio::test]
    async fn test_fetch_failure_without_entry_is_an_error() {
        let source = FakeSource::failing();
        let store = MemoryStore::default();
        let cache = build(&source, &store, &FixedDay::new(1));

        let result = cache.get_quote_of_the_day().await;

        match result {
            Err(DailyQuoteError::NoFallbackAvailable { source: err }) => {
                assert!(err.to_string().contains("offline"));
            }
            other => panic!("Expected NoFallbackAvailable, got {:?}", other),
        }
        assert!(store.entry().is_none());
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch_same_day() {
        let source = FakeSource::returning(quote("q1"));
        let store = MemoryStore::default();
        let cache = build(&source, &store, &FixedDay::new(100));

        cache.get_quote_of_the_day().await.unwrap();
        cache.clear_cache();
        assert!(store.entry().is_none());

        source.set(Ok(quote("q2")));
        let result = cache.get_quote_of_the_day().await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(result.quote.id, "q2");
        assert_eq!(result.freshness, Freshness::Fetched);
    }

    #[tokio::test]
    async fn test_clear_cache_on_empty_cache_is_noop() {
        let source = FakeSource::returning(quote("q1"));
        let store = MemoryStore::default();
        let cache = build(&source, &store, &FixedDay::new(100));

        cache.clear_cache();
        cache.clear_cache();

        assert!(store.entry().is_none());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_still_returns_fetched_quote() {
        let source = FakeSource::returning(quote("q1"));
        let store = MemoryStore::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        let cache = build(&source, &store, &FixedDay::new(7));

        let result = cache.get_quote_of_the_day().await.expect("Write failure must not propagate");

        assert_eq!(result.quote.id, "q1");
        assert_eq!(result.freshness, Freshness::Fetched);
        assert!(store.entry().is_none());

        // Nothing was cached, so the next call fetches again
        cache.get_quote_of_the_day().await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_read_failure_is_treated_as_miss() {
        let source = FakeSource::returning(quote("fresh"));
        let store = MemoryStore::default();
        *store.slot.lock().unwrap() = Some(CacheEntry::new(quote("old"), 7));
        store.failing_reads.store(1, Ordering::SeqCst);
        let cache = build(&source, &store, &FixedDay::new(7));

        let result = cache.get_quote_of_the_day().await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(result.quote.id, "fresh");
        assert_eq!(store.entry().unwrap().quote.id, "fresh");
    }

    #[tokio::test]
    async fn test_read_failure_then_fetch_failure_retries_read_for_fallback() {
        let source = FakeSource::failing();
        let store = MemoryStore::default();
        *store.slot.lock().unwrap() = Some(CacheEntry::new(quote("old"), 10));
        store.failing_reads.store(1, Ordering::SeqCst);
        let cache = build(&source, &store, &FixedDay::new(12));

        let result = cache.get_quote_of_the_day().await.expect("Second read should rescue");

        assert_eq!(result.quote.id, "old");
        assert!(result.is_stale());
    }

    #[tokio::test]
    async fn test_persistent_read_failure_and_fetch_failure_is_an_error() {
        let source = FakeSource::failing();
        let store = MemoryStore::default();
        *store.slot.lock().unwrap() = Some(CacheEntry::new(quote("old"), 10));
        store.failing_reads.store(usize::MAX, Ordering::SeqCst);
        let cache = build(&source, &store, &FixedDay::new(12));

        let result = cache.get_quote_of_the_day().await;

        assert!(matches!(
            result,
            Err(DailyQuoteError::NoFallbackAvailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_fetch_leaves_cache_untouched() {
        let store = MemoryStore::default();
        let previous = CacheEntry::new(quote("yesterday"), 44);
        *store.slot.lock().unwrap() = Some(previous.clone());
        let cache = DailyQuoteCache::with_clock(PendingSource, store.clone(), FixedDay::new(45));

        let outcome =
            tokio::time::timeout(Duration::from_millis(20), cache.get_quote_of_the_day()).await;

        assert!(outcome.is_err(), "Fetch should still be pending");
        assert_eq!(store.entry(), Some(previous));
    }

    #[tokio::test]
    async fn test_concurrent_callers_on_cold_cache_all_get_the_quote() {
        let source = FakeSource::returning(quote("q1"));
        let store = MemoryStore::default();
        let cache = build(&source, &store, &FixedDay::new(3));

        let (a, b) = tokio::join!(cache.get_quote_of_the_day(), cache.get_quote_of_the_day());

        assert_eq!(a.unwrap().quote.id, "q1");
        assert_eq!(b.unwrap().quote.id, "q1");
        assert!((1..=2).contains(&source.calls()));
        assert_eq!(store.entry().unwrap().quote.id, "q1");
    }
}
