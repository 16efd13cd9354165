//! Filter-and-aggregate engine behind the bike-sharing dashboard.
//!
//! [`DatasetStore`] loads the daily and hourly tables once; the functions in
//! [`engine`] derive filtered views and grouped summaries from them on every
//! sidebar change. [`DashboardState`] keeps the sidebar selections and the
//! view they produce.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod report;
pub mod state;

pub use data::model::{DayType, Granularity, Record, Season, Table, Weather};
pub use data::raw::{Cell, RawTable};
pub use data::store::DatasetStore;
pub use engine::{
    filter, group_and_reduce, AggregateSpec, FilterSpec, GroupKey, GroupSummary, Reduction,
    Target,
};
pub use error::{ConfigError, FilterError, IngestError};
pub use state::DashboardState;
