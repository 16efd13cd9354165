use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::model::{DayType, Record, Season, Table, Weather};
use crate::error::FilterError;

// ---------------------------------------------------------------------------
// FilterSpec – independent optional predicates, combined by AND
// ---------------------------------------------------------------------------

/// Declarative row filter. `None` means "no restriction" for that field.
///
/// A membership set that is present but empty matches nothing: deselecting
/// every option shows zero rows, not all rows.
///
/// Sets are `BTreeSet`s so two specs selecting the same codes in a different
/// order compare and hash equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Inclusive month range `(lo, hi)`.
    pub months: Option<(u8, u8)>,
    pub seasons: Option<BTreeSet<Season>>,
    pub weather: Option<BTreeSet<Weather>>,
    pub workingday: Option<bool>,
    pub holiday: Option<bool>,
    pub day_type: Option<DayType>,
    /// Inclusive lower date bound.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub date_until: Option<NaiveDate>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn months(mut self, lo: u8, hi: u8) -> Self {
        self.months = Some((lo, hi));
        self
    }

    pub fn seasons(mut self, seasons: impl IntoIterator<Item = Season>) -> Self {
        self.seasons = Some(seasons.into_iter().collect());
        self
    }

    pub fn weather(mut self, weather: impl IntoIterator<Item = Weather>) -> Self {
        self.weather = Some(weather.into_iter().collect());
        self
    }

    /// Season selection from raw codes; codes outside 1..=4 are rejected.
    pub fn season_codes(self, codes: &[u8]) -> Result<Self, FilterError> {
        let seasons = codes
            .iter()
            .map(|&c| Season::try_from(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.seasons(seasons))
    }

    /// Weather selection from raw codes; codes outside 1..=4 are rejected.
    pub fn weather_codes(self, codes: &[u8]) -> Result<Self, FilterError> {
        let weather = codes
            .iter()
            .map(|&c| Weather::try_from(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.weather(weather))
    }

    pub fn workingday(mut self, workingday: bool) -> Self {
        self.workingday = Some(workingday);
        self
    }

    pub fn holiday(mut self, holiday: bool) -> Self {
        self.holiday = Some(holiday);
        self
    }

    pub fn day_type(mut self, day_type: DayType) -> Self {
        self.day_type = Some(day_type);
        self
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_until(mut self, date: NaiveDate) -> Self {
        self.date_until = Some(date);
        self
    }

    /// Check the range predicates.
    pub fn validate(&self) -> Result<(), FilterError> {
        if let Some((lo, hi)) = self.months {
            if lo > hi {
                return Err(FilterError::InvalidRange {
                    field: "month",
                    lower: lo.to_string(),
                    upper: hi.to_string(),
                });
            }
        }
        if let (Some(from), Some(until)) = (self.date_from, self.date_until) {
            if from > until {
                return Err(FilterError::InvalidRange {
                    field: "date",
                    lower: from.to_string(),
                    upper: until.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether a single record passes every present predicate.
    ///
    /// Out-of-set category codes in the data are never members of a selection.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some((lo, hi)) = self.months {
            if record.month < lo || record.month > hi {
                return false;
            }
        }
        if let Some(seasons) = &self.seasons {
            match Season::try_from(record.season) {
                Ok(s) if seasons.contains(&s) => {}
                _ => return false,
            }
        }
        if let Some(weather) = &self.weather {
            match Weather::try_from(record.weathersit) {
                Ok(w) if weather.contains(&w) => {}
                _ => return false,
            }
        }
        if self.workingday.is_some_and(|w| w != record.workingday) {
            return false;
        }
        if self.holiday.is_some_and(|h| h != record.holiday) {
            return false;
        }
        if self.day_type.is_some_and(|d| d != record.day_type()) {
            return false;
        }
        if self.date_from.is_some_and(|from| record.date < from) {
            return false;
        }
        if self.date_until.is_some_and(|until| record.date > until) {
            return false;
        }
        true
    }
}

/// Return the rows of `table` that pass `spec`, in source order.
///
/// An empty table yields an empty table without looking at the spec.
pub fn filter(table: &Table, spec: &FilterSpec) -> Result<Table, FilterError> {
    if table.is_empty() {
        return Ok(Table::new(table.granularity(), Vec::new()));
    }
    spec.validate()?;

    let records: Vec<Record> = table.iter().filter(|r| spec.matches(r)).copied().collect();
    log::debug!(
        "filter {}: {} -> {} rows",
        table.granularity(),
        table.len(),
        records.len()
    );
    Ok(Table::new(table.granularity(), records))
}
