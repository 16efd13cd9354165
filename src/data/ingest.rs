use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::model::{Granularity, Record, Table};
use super::raw::{Cell, RawTable};
use crate::error::IngestError;

/// Columns every source must carry.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "dteday",
    "season",
    "mnth",
    "weekday",
    "workingday",
    "weathersit",
    "windspeed",
    "cnt",
    "registered",
];

/// Extra column required on the hourly source.
pub const HOUR_COLUMN: &str = "hr";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Resolved column positions for one source.
struct Columns {
    date: usize,
    season: usize,
    month: usize,
    weekday: usize,
    workingday: usize,
    weathersit: usize,
    windspeed: usize,
    cnt: usize,
    registered: usize,
    hour: Option<usize>,
    holiday: Option<usize>,
    casual: Option<usize>,
}

impl Columns {
    fn resolve(raw: &RawTable, granularity: Granularity) -> Result<Self, IngestError> {
        let required = |column: &'static str| {
            raw.column_index(column)
                .ok_or_else(|| IngestError::MissingColumn {
                    source_name: raw.source_name.clone(),
                    column,
                })
        };
        let [date, season, month, weekday, workingday, weathersit, windspeed, cnt, registered] =
            REQUIRED_COLUMNS;

        Ok(Columns {
            date: required(date)?,
            season: required(season)?,
            month: required(month)?,
            weekday: required(weekday)?,
            workingday: required(workingday)?,
            weathersit: required(weathersit)?,
            windspeed: required(windspeed)?,
            cnt: required(cnt)?,
            registered: required(registered)?,
            hour: match granularity {
                Granularity::Hourly => Some(required(HOUR_COLUMN)?),
                Granularity::Daily => raw.column_index(HOUR_COLUMN),
            },
            holiday: raw.column_index("holiday"),
            casual: raw.column_index("casual"),
        })
    }
}

/// Normalize a raw row set into a typed [`Table`].
///
/// Fails when a required column is missing, the row set is empty, or any
/// date / numeric cell cannot be parsed. Category codes are not checked
/// against their declared sets. Nulls in the optional `holiday` / `casual`
/// columns read as "not a holiday" / unknown.
pub fn normalize(raw: &RawTable, granularity: Granularity) -> Result<Table, IngestError> {
    let cols = Columns::resolve(raw, granularity)?;
    if raw.is_empty() {
        return Err(IngestError::Empty {
            source_name: raw.source_name.clone(),
        });
    }

    let mut records = Vec::with_capacity(raw.len());
    for (row_no, row) in raw.rows.iter().enumerate() {
        let cells = RowCells {
            source_name: &raw.source_name,
            row_no,
            row,
        };
        records.push(Record {
            date: cells.date(cols.date)?,
            hour: cols
                .hour
                .map(|idx| cells.bounded::<u8>(idx, "hr", 0, 23))
                .transpose()?,
            month: cells.bounded(cols.month, "mnth", 1, 12)?,
            season: cells.code(cols.season, "season")?,
            weathersit: cells.code(cols.weathersit, "weathersit")?,
            holiday: match cols.holiday {
                Some(idx) if !cells.is_null(idx) => cells.flag(idx, "holiday")?,
                _ => false,
            },
            workingday: cells.flag(cols.workingday, "workingday")?,
            weekday: cells.bounded(cols.weekday, "weekday", 0, 6)?,
            windspeed: cells.non_negative_float(cols.windspeed, "windspeed")?,
            casual: cols
                .casual
                .filter(|&idx| !cells.is_null(idx))
                .map(|idx| cells.count(idx, "casual"))
                .transpose()?,
            registered: cells.count(cols.registered, "registered")?,
            cnt: cells.count(cols.cnt, "cnt")?,
        });
    }

    Ok(Table::new(granularity, records))
}

// ---------------------------------------------------------------------------
// Per-row cell parsing
// ---------------------------------------------------------------------------

struct RowCells<'a> {
    source_name: &'a str,
    row_no: usize,
    row: &'a [Cell],
}

impl RowCells<'_> {
    fn invalid(&self, column: &'static str, cell: &Cell) -> IngestError {
        IngestError::InvalidValue {
            source_name: self.source_name.to_string(),
            row: self.row_no,
            column,
            value: cell.to_string(),
        }
    }

    fn is_null(&self, idx: usize) -> bool {
        self.row[idx].is_null()
    }

    fn date(&self, idx: usize) -> Result<NaiveDate, IngestError> {
        let cell = &self.row[idx];
        let parsed = match cell {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => parse_date(s),
            // Epoch milliseconds, as `to_json` writes a datetime column.
            Cell::Integer(ms) => DateTime::from_timestamp_millis(*ms).map(|dt| dt.date_naive()),
            _ => None,
        };
        parsed.ok_or_else(|| IngestError::InvalidDate {
            source_name: self.source_name.to_string(),
            row: self.row_no,
            value: cell.to_string(),
        })
    }

    fn integer(&self, idx: usize, column: &'static str) -> Result<i64, IngestError> {
        let cell = &self.row[idx];
        cell.as_i64().ok_or_else(|| self.invalid(column, cell))
    }

    fn bounded<T: TryFrom<i64>>(
        &self,
        idx: usize,
        column: &'static str,
        lo: i64,
        hi: i64,
    ) -> Result<T, IngestError> {
        let value = self.integer(idx, column)?;
        if !(lo..=hi).contains(&value) {
            return Err(self.invalid(column, &self.row[idx]));
        }
        T::try_from(value).map_err(|_| self.invalid(column, &self.row[idx]))
    }

    /// Category code; any value that fits a `u8` is kept as observed.
    fn code(&self, idx: usize, column: &'static str) -> Result<u8, IngestError> {
        self.bounded(idx, column, 0, i64::from(u8::MAX))
    }

    fn flag(&self, idx: usize, column: &'static str) -> Result<bool, IngestError> {
        match self.integer(idx, column)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(self.invalid(column, &self.row[idx])),
        }
    }

    fn count(&self, idx: usize, column: &'static str) -> Result<u32, IngestError> {
        self.bounded(idx, column, 0, i64::from(u32::MAX))
    }

    fn non_negative_float(&self, idx: usize, column: &'static str) -> Result<f64, IngestError> {
        let cell = &self.row[idx];
        match cell.as_f64() {
            Some(v) if v >= 0.0 && v.is_finite() => Ok(v),
            _ => Err(self.invalid(column, cell)),
        }
    }
}

/// Parse a calendar date, accepting a trailing time-of-day.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}
