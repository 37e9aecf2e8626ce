//! Supabase (PostgREST) client for the `quotes` table
//!
//! Fetches quotes over the PostgREST HTTP interface and maps rows to
//! [`Quote`]. When a user id is configured, the user's favorites are fetched
//! alongside each query so `is_favorite` can be filled in.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::search::filter_search_results;
use super::source::{QuoteSource, SourceError};
use super::{Quote, QuoteCategory};
use crate::daily::{DayClock, LocalDayClock};

/// Quotes per page when browsing by category
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Default network request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound on rows fetched for a text search
const SEARCH_LIMIT: usize = 100;

/// Upper bound on rows fetched for an author search
const AUTHOR_SEARCH_LIMIT: usize = 50;

/// Columns selected from the `quotes` table
const QUOTE_COLUMNS: &str = "id,text,author,category,created_at";

/// Connection settings for a Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Public anon key, sent as `apikey`
    pub anon_key: String,
    /// User session token; the anon key is used as bearer when absent
    pub access_token: Option<String>,
    /// User whose favorites decide `Quote::is_favorite`
    pub user_id: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl SupabaseConfig {
    /// Creates a config with no user session and the default timeout
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            access_token: None,
            user_id: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// A row of the `quotes` table
#[derive(Debug, Deserialize)]
struct QuoteRow {
    id: String,
    text: String,
    #[serde(default)]
    author: Option<String>,
    category: String,
    created_at: String,
}

/// A row of the `user_favorites` table
#[derive(Debug, Deserialize)]
struct FavoriteRow {
    quote_id: String,
}

impl QuoteRow {
    fn into_quote(self, favorites: &HashSet<String>) -> Quote {
        let is_favorite = favorites.contains(&self.id);
        Quote {
            category: map_category(&self.category),
            created_at: parse_created_at(&self.created_at),
            author: self.author.unwrap_or_default(),
            id: self.id,
            text: self.text,
            is_favorite,
        }
    }
}

/// Maps a stored category name, filing unknown names under General
fn map_category(raw: &str) -> QuoteCategory {
    QuoteCategory::parse(raw).unwrap_or_else(|| {
        tracing::warn!(category = raw, "Unknown quote category, using General");
        QuoteCategory::General
    })
}

/// Converts an RFC 3339 timestamp to epoch millis, falling back to now
fn parse_created_at(raw: &str) -> i64 {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|_| Utc::now().timestamp_millis())
}

/// Builds a quoted `ilike` pattern for use inside a PostgREST `or=(...)` filter
fn quoted_ilike(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"*{}*\"", escaped)
}

/// Row offset of a 1-indexed page (0 is treated as 1)
///
/// # Returns
/// * `Ok(offset)` when `(page - 1) * page_size` fits in a `usize`
/// * `Err(SourceError::PageOutOfRange)` when it overflows
pub fn page_offset(page: usize, page_size: usize) -> Result<usize, SourceError> {
    page.saturating_sub(1)
        .checked_mul(page_size)
        .ok_or(SourceError::PageOutOfRange { page, page_size })
}

/// Builds a PostgREST `in.(...)` filter value for a set of ids, in sorted order
fn in_filter(ids: &HashSet<String>) -> String {
    let mut sorted: Vec<&String> = ids.iter().collect();
    sorted.sort();
    let quoted: Vec<String> = sorted
        .into_iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Keeps only rows whose id is a favorite, marking each as favorited
fn favorite_quotes(rows: Vec<QuoteRow>, favorites: &HashSet<String>) -> Vec<Quote> {
    rows.into_iter()
        .filter(|row| favorites.contains(&row.id))
        .map(|row| row.into_quote(favorites))
        .collect()
}

/// Picks the item for a given day of the year
///
/// The same day always yields the same item as long as the list is
/// unchanged. Returns `None` for an empty list.
pub fn select_for_day<T>(items: &[T], day_of_year: u32) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    items.get(day_of_year as usize % items.len())
}

/// Client for reading quotes from a Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Connection settings
    config: SupabaseConfig,
    /// Clock used to pick the quote of the day
    clock: LocalDayClock,
}

impl SupabaseClient {
    /// Creates a new client from explicit settings
    ///
    /// # Returns
    /// * `Ok(SupabaseClient)` on success
    /// * `Err(SourceError::Http)` if the HTTP client cannot be built
    pub fn new(config: SupabaseConfig) -> Result<Self, SourceError> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            config,
            clock: LocalDayClock,
        })
    }

    /// Returns the REST endpoint for a table
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    /// Issues a GET against a table and decodes the JSON array response
    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, SourceError> {
        let token = self
            .config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.anon_key);

        let response = self
            .http_client
            .get(self.rest_url(table))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        Ok(response.json::<Vec<T>>().await?)
    }

    /// Fetches the ids of the configured user's favorite quotes
    async fn favorite_ids(&self) -> Result<HashSet<String>, SourceError> {
        let Some(user_id) = &self.config.user_id else {
            return Ok(HashSet::new());
        };

        let rows: Vec<FavoriteRow> = self
            .get_rows(
                "user_favorites",
                &[
                    ("select", "quote_id".to_string()),
                    ("user_id", format!("eq.{}", user_id)),
                ],
            )
            .await?;

        Ok(rows.into_iter().map(|row| row.quote_id).collect())
    }

    /// Fetches quotes matching `query` with favorite membership filled in
    ///
    /// A failure to load favorites is logged and treated as "no favorites"
    /// so that browsing still works.
    async fn fetch_quotes(&self, query: &[(&str, String)]) -> Result<Vec<Quote>, SourceError> {
        let (rows, favorites) = futures::join!(
            self.get_rows::<QuoteRow>("quotes", query),
            self.favorite_ids()
        );

        let favorites = favorites.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load favorites");
            HashSet::new()
        });

        Ok(rows?
            .into_iter()
            .map(|row| row.into_quote(&favorites))
            .collect())
    }

    /// Fetches one page of quotes ordered by id
    ///
    /// # Arguments
    /// * `page` - Page number, 1-indexed (0 is treated as 1)
    /// * `page_size` - Number of quotes per page
    pub async fn get_quotes(&self, page: usize, page_size: usize) -> Result<Vec<Quote>, SourceError> {
        let offset = page_offset(page, page_size)?;
        self.fetch_quotes(&[
            ("select", QUOTE_COLUMNS.to_string()),
            ("order", "id.asc".to_string()),
            ("limit", page_size.to_string()),
            ("offset", offset.to_string()),
        ])
        .await
    }

    /// Fetches one page of quotes in a category, newest first
    pub async fn get_quotes_by_category(
        &self,
        category: QuoteCategory,
        page: usize,
    ) -> Result<Vec<Quote>, SourceError> {
        let offset = page_offset(page, DEFAULT_PAGE_SIZE)?;
        self.fetch_quotes(&[
            ("select", QUOTE_COLUMNS.to_string()),
            ("category", format!("eq.{}", category.symbol())),
            ("order", "created_at.desc".to_string()),
            ("limit", DEFAULT_PAGE_SIZE.to_string()),
            ("offset", offset.to_string()),
        ])
        .await
    }

    /// Fetches the configured user's favorite quotes, newest first
    ///
    /// Returns an empty list when no user id is configured or the user has
    /// no favorites. Unlike browsing, a failure to load the favorite ids is
    /// an error here.
    pub async fn get_favorites(&self) -> Result<Vec<Quote>, SourceError> {
        let favorites = self.favorite_ids().await?;
        if favorites.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<QuoteRow> = self
            .get_rows(
                "quotes",
                &[
                    ("select", QUOTE_COLUMNS.to_string()),
                    ("id", in_filter(&favorites)),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await?;

        tracing::debug!(count = favorites.len(), "Loaded favorite quotes");
        Ok(favorite_quotes(rows, &favorites))
    }

    /// Searches quote text and authors, optionally within one category
    ///
    /// Results are narrowed with [`filter_search_results`].
    pub async fn search_quotes(
        &self,
        query: &str,
        category: Option<QuoteCategory>,
    ) -> Result<Vec<Quote>, SourceError> {
        let pattern = quoted_ilike(query.trim());
        let mut params = vec![
            ("select", QUOTE_COLUMNS.to_string()),
            (
                "or",
                format!("(text.ilike.{},author.ilike.{})", pattern, pattern),
            ),
            ("order", "created_at.desc".to_string()),
            ("limit", SEARCH_LIMIT.to_string()),
        ];
        if let Some(category) = category {
            params.push(("category", format!("eq.{}", category.symbol())));
        }

        let quotes = self.fetch_quotes(&params).await?;
        Ok(filter_search_results(quotes, query))
    }

    /// Fetches quotes whose author contains `author`, newest first
    pub async fn search_by_author(&self, author: &str) -> Result<Vec<Quote>, SourceError> {
        self.fetch_quotes(&[
            ("select", QUOTE_COLUMNS.to_string()),
            ("author", format!("ilike.*{}*", author.trim())),
            ("order", "created_at.desc".to_string()),
            ("limit", AUTHOR_SEARCH_LIMIT.to_string()),
        ])
        .await
    }

    /// Fetches a single quote by id
    ///
    /// # Returns
    /// * `Ok(Quote)` if the quote exists
    /// * `Err(SourceError::NotFound)` if no row has this id
    pub async fn get_quote_by_id(&self, id: &str) -> Result<Quote, SourceError> {
        self.fetch_quotes(&[
            ("select", QUOTE_COLUMNS.to_string()),
            ("id", format!("eq.{}", id)),
            ("limit", "1".to_string()),
        ])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}

impl QuoteSource for SupabaseClient {
    /// Picks today's quote by day-of-year modulo the number of quotes
    async fn fetch_quote_of_the_day(&self) -> Result<Quote, SourceError> {
        let day = self.clock.day_of_year();
        tracing::debug!(day, "Fetching quote of the day");

        let quotes = self
            .fetch_quotes(&[
                ("select", QUOTE_COLUMNS.to_string()),
                ("order", "id.asc".to_string()),
            ])
            .await?;

        let quote = select_for_day(&quotes, day).cloned().ok_or_else(|| {
            tracing::warn!("No quotes available in database");
            SourceError::Empty
        })?;

        tracing::debug!(day, total = quotes.len(), id = %quote.id, "Selected quote of the day");
        Ok(quote)
    }
}
