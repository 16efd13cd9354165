use std::sync::Arc;

use crate::data::model::{Season, Table, Weather};
use crate::data::store::DatasetStore;
use crate::engine::filter::{filter, FilterSpec};
use crate::error::FilterError;

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The sidebar selections and the daily view they produce, independent of
/// rendering.
///
/// Every widget change builds a candidate [`FilterSpec`] and re-runs the
/// filter. A rejected input leaves both the spec and the view untouched.
pub struct DashboardState {
    store: DatasetStore,

    /// Current, always-valid selections.
    filters: FilterSpec,

    /// Daily rows passing `filters` (cached).
    visible: Arc<Table>,
}

impl DashboardState {
    /// Start with everything selected: full month span, all seasons, all weather.
    pub fn new(store: DatasetStore) -> Result<Self, FilterError> {
        let daily = store.daily();
        let lo = daily.iter().map(|r| r.month).min().unwrap_or(1);
        let hi = daily.iter().map(|r| r.month).max().unwrap_or(12);
        let filters = FilterSpec::new()
            .months(lo, hi)
            .seasons(Season::ALL)
            .weather(Weather::ALL);
        Self::with_filters(store, filters)
    }

    pub fn with_filters(store: DatasetStore, filters: FilterSpec) -> Result<Self, FilterError> {
        let visible = Arc::new(filter(&store.daily(), &filters)?);
        Ok(DashboardState {
            store,
            filters,
            visible,
        })
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    /// Daily rows passing the current selections.
    pub fn visible(&self) -> Arc<Table> {
        Arc::clone(&self.visible)
    }

    /// Replace the selections. On error the previous state is kept.
    pub fn apply(&mut self, candidate: FilterSpec) -> Result<(), FilterError> {
        if candidate == self.filters {
            return Ok(());
        }
        match filter(&self.store.daily(), &candidate) {
            Ok(view) => {
                self.filters = candidate;
                self.visible = Arc::new(view);
                Ok(())
            }
            Err(e) => {
                log::warn!("rejected filter change: {e}");
                Err(e)
            }
        }
    }

    pub fn set_months(&mut self, lo: u8, hi: u8) -> Result<(), FilterError> {
        self.apply(self.filters.clone().months(lo, hi))
    }

    /// Toggle a single season in the selection.
    pub fn toggle_season(&mut self, season: Season) -> Result<(), FilterError> {
        let mut candidate = self.filters.clone();
        let selected = candidate.seasons.get_or_insert_with(Default::default);
        if !selected.remove(&season) {
            selected.insert(season);
        }
        self.apply(candidate)
    }

    /// Toggle a single weather condition in the selection.
    pub fn toggle_weather(&mut self, weather: Weather) -> Result<(), FilterError> {
        let mut candidate = self.filters.clone();
        let selected = candidate.weather.get_or_insert_with(Default::default);
        if !selected.remove(&weather) {
            selected.insert(weather);
        }
        self.apply(candidate)
    }

    /// The "all seasons" option.
    pub fn select_all_seasons(&mut self) -> Result<(), FilterError> {
        self.apply(self.filters.clone().seasons(Season::ALL))
    }

    pub fn select_no_seasons(&mut self) -> Result<(), FilterError> {
        self.apply(self.filters.clone().seasons(std::iter::empty()))
    }

    pub fn select_all_weather(&mut self) -> Result<(), FilterError> {
        self.apply(self.filters.clone().weather(Weather::ALL))
    }

    pub fn select_no_weather(&mut self) -> Result<(), FilterError> {
        self.apply(self.filters.clone().weather(std::iter::empty()))
    }

    /// `None` clears the working-day restriction.
    pub fn set_workingday(&mut self, workingday: Option<bool>) -> Result<(), FilterError> {
        let mut candidate = self.filters.clone();
        candidate.workingday = workingday;
        self.apply(candidate)
    }
}
