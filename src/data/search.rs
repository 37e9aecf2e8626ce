//! Client-side ranking of search results
//!
//! The backend matches a query against text or author with a plain
//! substring filter. This narrows that result set to what the user most
//! likely meant: a category, then an author, then free text.

use super::{Quote, QuoteCategory};

/// Finds the first category whose symbol or display name equals or contains `query`
///
/// `query` must already be lowercased.
fn matching_category(query: &str) -> Option<QuoteCategory> {
    QuoteCategory::all().iter().copied().find(|category| {
        let symbol = category.symbol().to_lowercase();
        let display = category.display_name().to_lowercase();
        symbol == query || symbol.contains(query) || display == query || display.contains(query)
    })
}

/// Filters and orders search results by match type
///
/// Each quote lands in at most one bucket, checked in this order:
/// 1. category: the query names a category and the quote belongs to it
/// 2. author: the author contains the query; exact and prefix matches go first
/// 3. text: the quote text contains the query
///
/// Only the first non-empty bucket is returned, so searching for an author
/// never mixes in quotes that merely mention that name. An empty (or
/// whitespace) query returns the input unchanged.
pub fn filter_search_results(quotes: Vec<Quote>, query: &str) -> Vec<Quote> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return quotes;
    }

    let category = matching_category(&query);

    let mut category_matches = Vec::new();
    let mut author_matches = Vec::new();
    let mut text_matches = Vec::new();

    for quote in quotes {
        let author = quote.author.to_lowercase();

        if category.is_some_and(|c| c == quote.category) {
            category_matches.push(quote);
        } else if author.contains(&query) {
            if author == query || author.starts_with(&query) {
                author_matches.insert(0, quote);
            } else {
                author_matches.push(quote);
            }
        } else if quote.text.to_lowercase().contains(&query) {
            text_matches.push(quote);
        }
    }

    if !category_matches.is_empty() {
        category_matches
    } else if !author_matches.is_empty() {
        author_matches
    } else {
        text_matches
    }
}
