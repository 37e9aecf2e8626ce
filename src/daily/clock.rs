//! Day-of-year time source

use chrono::{Datelike, Local};

/// Source of "today" for the daily quote cache
pub trait DayClock: Send + Sync {
    /// Current day of the year, 1-366
    fn day_of_year(&self) -> u32;
}

/// Reads the day of the year from the local calendar
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDayClock;

impl DayClock for LocalDayClock {
    fn day_of_year(&self) -> u32 {
        Local::now().ordinal()
    }
}
