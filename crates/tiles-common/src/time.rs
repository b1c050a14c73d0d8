//! (date, time-of-day) keys for processing units.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{TilesError, TilesResult};

/// One processing unit: a model date plus a time-of-day label.
///
/// The label ("00:00", "12:00", ...) doubles as the directory name in
/// both the input tree and the tile store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    date: NaiveDate,
    time: String,
}

impl TimeSlot {
    /// Create a slot, validating the time label is `HH:MM`.
    pub fn new(date: NaiveDate, time: &str) -> TilesResult<Self> {
        NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
            TilesError::InvalidConfiguration(format!("time label '{time}' is not HH:MM"))
        })?;
        Ok(Self {
            date,
            time: time.to_string(),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Directory name for the date level (`YYYY-MM-DD`).
    pub fn date_dir(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Directory name for the time level.
    pub fn time_dir(&self) -> &str {
        &self.time
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date_dir(), self.time)
    }
}

/// Inclusive list of dates between start and end.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> TilesResult<Vec<NaiveDate>> {
    if end < start {
        return Err(TilesError::InvalidConfiguration(format!(
            "end date {end} precedes start date {start}"
        )));
    }
    Ok(start.iter_days().take_while(|d| *d <= end).collect())
}
