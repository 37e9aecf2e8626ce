//! Core data models for QuoteVault
//!
//! This module contains the quote types shared by the remote source, the
//! on-disk cache and the command-line front end.

pub mod search;
pub mod source;
pub mod supabase;

pub use search::filter_search_results;
pub use source::{QuoteSource, SourceError};
pub use supabase::SupabaseClient;

use serde::{Deserialize, Serialize};

/// A single quote as shown to the user
///
/// Field names serialize in camelCase (`createdAt`, `isFavorite`) and the
/// category as its symbolic name (`"WISDOM"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Unique identifier for the quote
    pub id: String,
    /// The quote itself
    pub text: String,
    /// Who said it; may be empty
    pub author: String,
    /// Category the quote is filed under
    pub category: QuoteCategory,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at: i64,
    /// Whether the requesting user has favorited this quote
    ///
    /// Not a property of the quote itself; it is computed against the
    /// configured user's favorite set and is `false` when no user is set.
    #[serde(default)]
    pub is_favorite: bool,
}

/// Categories for organizing quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteCategory {
    Motivation,
    Love,
    Success,
    Wisdom,
    Humor,
    General,
}

impl QuoteCategory {
    /// Returns every category in declaration order
    pub fn all() -> &'static [QuoteCategory] {
        &[
            QuoteCategory::Motivation,
            QuoteCategory::Love,
            QuoteCategory::Success,
            QuoteCategory::Wisdom,
            QuoteCategory::Humor,
            QuoteCategory::General,
        ]
    }

    /// Symbolic name used by the backend and the cache file
    pub fn symbol(&self) -> &'static str {
        match self {
            QuoteCategory::Motivation => "MOTIVATION",
            QuoteCategory::Love => "LOVE",
            QuoteCategory::Success => "SUCCESS",
            QuoteCategory::Wisdom => "WISDOM",
            QuoteCategory::Humor => "HUMOR",
            QuoteCategory::General => "GENERAL",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            QuoteCategory::Motivation => "Motivation",
            QuoteCategory::Love => "Love",
            QuoteCategory::Success => "Success",
            QuoteCategory::Wisdom => "Wisdom",
            QuoteCategory::Humor => "Humor",
            QuoteCategory::General => "General",
        }
    }

    /// Parses a category from its symbol or display name, ignoring case
    ///
    /// # Returns
    /// * `Some(QuoteCategory)` if the string names a category
    /// * `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.symbol().eq_ignore_ascii_case(wanted))
    }
}

impl std::fmt::Display for QuoteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
