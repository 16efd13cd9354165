use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FilterError;

// ---------------------------------------------------------------------------
// Category codes
// ---------------------------------------------------------------------------

/// Season code as used by the dataset (1 = spring .. 4 = winter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring = 1,
    Summer = 2,
    Fall = 3,
    Winter = 4,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Season {
    type Error = FilterError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Season::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(FilterError::UnknownCategory {
                field: "season",
                code,
            })
    }
}

/// Weather severity code, 1 (clear) to 4 (heavy rain / ice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weather {
    Clear = 1,
    Mist = 2,
    LightPrecipitation = 3,
    HeavyPrecipitation = 4,
}

impl Weather {
    pub const ALL: [Weather; 4] = [
        Weather::Clear,
        Weather::Mist,
        Weather::LightPrecipitation,
        Weather::HeavyPrecipitation,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Weather {
    type Error = FilterError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Weather::ALL
            .into_iter()
            .find(|w| w.code() == code)
            .ok_or(FilterError::UnknownCategory {
                field: "weathersit",
                code,
            })
    }
}

/// Day-type class derived from `weekday`.
///
/// Weekend is Sunday (0) and Saturday (6); every other code is a weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn of(weekday: u8) -> DayType {
        match weekday {
            0 | 6 => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of either table
// ---------------------------------------------------------------------------

/// A single normalized row. Category fields keep the raw code observed in the
/// data; only filter specs are validated against the declared sets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    /// Hour of day, hourly rows only.
    pub hour: Option<u8>,
    pub month: u8,
    pub season: u8,
    pub weathersit: u8,
    pub holiday: bool,
    pub workingday: bool,
    /// 0 = Sunday .. 6 = Saturday.
    pub weekday: u8,
    pub windspeed: f64,
    pub casual: Option<u32>,
    pub registered: u32,
    pub cnt: u32,
}

impl Record {
    pub fn day_type(&self) -> DayType {
        DayType::of(self.weekday)
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded (or derived) row set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    Daily,
    Hourly,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "day"),
            Granularity::Hourly => write!(f, "hour"),
        }
    }
}

/// Ordered rows of one granularity. Never mutated after construction;
/// filtering produces a new table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    granularity: Granularity,
    records: Vec<Record>,
}

impl Table {
    pub fn new(granularity: Granularity, records: Vec<Record>) -> Self {
        Table {
            granularity,
            records,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_validate_against_declared_set() {
        assert_eq!(Season::try_from(3), Ok(Season::Fall));
        assert_eq!(Weather::try_from(1), Ok(Weather::Clear));
        assert_eq!(
            Season::try_from(0),
            Err(FilterError::UnknownCategory {
                field: "season",
                code: 0
            })
        );
        assert!(Weather::try_from(5).is_err());
    }

    #[test]
    fn weekend_is_sunday_and_saturday() {
        assert_eq!(DayType::of(0), DayType::Weekend);
        assert_eq!(DayType::of(6), DayType::Weekend);
        for wd in 1..=5 {
            assert_eq!(DayType::of(wd), DayType::Weekday);
        }
    }

    #[test]
    fn head_clamps_to_length() {
        let t = Table::new(Granularity::Daily, Vec::new());
        assert!(t.head(5).is_empty());
    }
}
