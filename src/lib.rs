//! QuoteVault library
//!
//! Exposes the quote model, the Supabase quote source, the on-disk cache and
//! the day-keyed quote-of-the-day cache for the binary and integration tests.

pub mod cache;
pub mod cli;
pub mod daily;
pub mod data;
