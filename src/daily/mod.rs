//! Quote of the day
//!
//! Serves today's quote with at most one remote fetch per calendar day,
//! falling back to the last quote that was fetched when the backend fails.

mod clock;
mod quote_of_the_day;

pub use clock::{DayClock, LocalDayClock};
pub use quote_of_the_day::{DailyQuote, DailyQuoteCache, DailyQuoteError, Freshness};
