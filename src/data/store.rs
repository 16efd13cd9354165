use std::path::Path;
use std::sync::Arc;

use super::ingest::normalize;
use super::loader::load_file;
use super::model::{Granularity, Table};
use super::raw::RawTable;
use crate::error::IngestError;

// ---------------------------------------------------------------------------
// DatasetStore – the two loaded tables
// ---------------------------------------------------------------------------

/// Owns the `daily` and `hourly` tables for the lifetime of the process.
///
/// Tables are handed out as `Arc<Table>`; they are never mutated after load,
/// so any number of readers may filter them concurrently.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    daily: Arc<Table>,
    hourly: Arc<Table>,
}

impl DatasetStore {
    /// Ingest both row sets. Either one failing aborts the whole load.
    pub fn load(daily: &RawTable, hourly: &RawTable) -> Result<Self, IngestError> {
        let daily = normalize(daily, Granularity::Daily)?;
        let hourly = normalize(hourly, Granularity::Hourly)?;
        log::info!(
            "loaded {} daily and {} hourly records",
            daily.len(),
            hourly.len()
        );
        Ok(DatasetStore {
            daily: Arc::new(daily),
            hourly: Arc::new(hourly),
        })
    }

    /// Read both files (format by extension) and ingest them.
    pub fn load_files(daily_path: &Path, hourly_path: &Path) -> Result<Self, IngestError> {
        let daily = load_file(daily_path)?;
        let hourly = load_file(hourly_path)?;
        Self::load(&daily, &hourly)
    }

    pub fn daily(&self) -> Arc<Table> {
        Arc::clone(&self.daily)
    }

    pub fn hourly(&self) -> Arc<Table> {
        Arc::clone(&self.hourly)
    }

    pub fn table(&self, granularity: Granularity) -> Arc<Table> {
        match granularity {
            Granularity::Daily => self.daily(),
            Granularity::Hourly => self.hourly(),
        }
    }
}
