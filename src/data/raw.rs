use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Cell – a single untyped value as it came out of a source file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Only produced by typed sources (Parquet `Date32`).
    Date(NaiveDate),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Date(d) => write!(f, "{d}"),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

impl Cell {
    /// Guess the type of a text field (CSV cells arrive as strings).
    pub fn guess(s: &str) -> Cell {
        let s = s.trim();
        if s.is_empty() {
            return Cell::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Cell::Float(f);
        }
        if s == "true" || s == "false" {
            return Cell::Bool(s == "true");
        }
        Cell::Text(s.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integral value; floats are accepted only when they carry no fraction
    /// (pandas writes integer columns with nulls as `float64`).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            Cell::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

// ---------------------------------------------------------------------------
// RawTable – a row set before normalization
// ---------------------------------------------------------------------------

/// Row-oriented input handed to [`DatasetStore::load`](crate::data::store::DatasetStore::load).
///
/// Every row has exactly `columns.len()` cells; missing values are [`Cell::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Human readable origin, used in error messages (file name, "day", ...).
    pub source_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(source_name: impl Into<String>, columns: Vec<String>) -> Self {
        RawTable {
            source_name: source_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with nulls and dropping extra cells.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Add a column (filled with nulls for existing rows) and return its index.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Cell::Null);
        }
        self.columns.len() - 1
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_picks_narrowest_type() {
        assert_eq!(Cell::guess("3"), Cell::Integer(3));
        assert_eq!(Cell::guess("0.160446"), Cell::Float(0.160446));
        assert_eq!(Cell::guess(" "), Cell::Null);
        assert_eq!(Cell::guess("true"), Cell::Bool(true));
        assert_eq!(
            Cell::guess("2011-01-01"),
            Cell::Text("2011-01-01".to_string())
        );
    }

    #[test]
    fn integral_floats_read_as_integers() {
        assert_eq!(Cell::Float(4.0).as_i64(), Some(4));
        assert_eq!(Cell::Float(4.5).as_i64(), None);
        assert_eq!(Cell::Text("4".into()).as_i64(), None);
    }

    #[test]
    fn ensure_column_pads_existing_rows() {
        let mut raw = RawTable::new("t", vec!["a".into()]);
        raw.push_row(vec![Cell::Integer(1)]);
        let idx = raw.ensure_column("b");
        assert_eq!(idx, 1);
        assert_eq!(raw.rows[0], vec![Cell::Integer(1), Cell::Null]);
        assert_eq!(raw.ensure_column("a"), 0);
    }
}
