//! Workday calendar
//!
//! Maps 0-based working-day indices to calendar dates through a pluggable
//! workday predicate. The scheduler itself only reasons about working-day
//! indices; the calendar is consulted once, when a solved plan is joined
//! back onto dates.

use chrono::{Datelike, NaiveDate, TimeDelta};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Workday classification plus index-to-date mapping.
///
/// The default calendar treats Monday through Friday as working days.
/// A custom predicate can model four-day weeks, company holidays, and so on.
#[derive(Clone)]
pub struct Calendar {
    filter: Arc<dyn Fn(NaiveDate) -> bool + Send + Sync>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(|date| date.weekday().num_days_from_monday() < 5)
    }
}

impl std::fmt::Debug for Calendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calendar").finish_non_exhaustive()
    }
}

impl Calendar {
    /// Create a calendar from a workday predicate.
    ///
    /// The predicate must accept infinitely many future dates; a predicate
    /// that eventually rejects every date makes index-to-date mapping
    /// diverge.
    pub fn new(filter: impl Fn(NaiveDate) -> bool + Send + Sync + 'static) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }

    /// Check whether a date is a working day
    pub fn is_workday(&self, date: NaiveDate) -> bool {
        (self.filter)(date)
    }

    /// Map working-day indices `0..=last_day` to calendar dates.
    ///
    /// Day 0 is the first working day on or after `start_date`; a start
    /// date that is not a working day advances to the next one. Each
    /// subsequent index advances one calendar day at a time, skipping
    /// dates the predicate rejects, so the resulting sequence is strictly
    /// increasing and contains only working days.
    pub fn days_to_date(&self, start_date: NaiveDate, last_day: u32) -> BTreeMap<u32, NaiveDate> {
        let mut current = start_date;
        while !self.is_workday(current) {
            current = current + TimeDelta::days(1);
        }

        let mut dates = BTreeMap::new();
        dates.insert(0, current);
        for day in 1..=last_day {
            current = current + TimeDelta::days(1);
            while !self.is_workday(current) {
                current = current + TimeDelta::days(1);
            }
            dates.insert(day, current);
        }
        dates
    }
}
