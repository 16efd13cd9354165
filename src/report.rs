use std::fmt;

use serde::Serialize;

use crate::config::ReportConfig;
use crate::data::model::{DayType, Record, Table};
use crate::engine::aggregate::{group_and_reduce, AggregateSpec, GroupKey, Reduction, Target};
use crate::engine::filter::{filter, FilterSpec};
use crate::engine::stats::{box_summaries, linear_fit, scatter_points, BoxSummary, LinearFit};
use crate::error::FilterError;

// ---------------------------------------------------------------------------
// Display labels (presentation only; the engine works on raw codes)
// ---------------------------------------------------------------------------

pub fn weather_label(code: u8) -> String {
    match code {
        1 => "Clear".to_string(),
        2 => "Mist".to_string(),
        3 => "Light rain/snow".to_string(),
        4 => "Heavy rain/ice".to_string(),
        other => format!("weathersit {other}"),
    }
}

pub fn season_label(code: u8) -> String {
    match code {
        1 => "Spring".to_string(),
        2 => "Summer".to_string(),
        3 => "Fall".to_string(),
        4 => "Winter".to_string(),
        other => format!("season {other}"),
    }
}

// ---------------------------------------------------------------------------
// Panel 1: registered users per weather condition in the filtered view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherTotal {
    pub code: u8,
    pub label: String,
    pub registered: f64,
}

/// Sum of `registered` per weathersit over the sidebar-filtered daily view.
pub fn registered_by_weather(visible: &Table) -> Vec<WeatherTotal> {
    group_and_reduce(
        visible,
        &AggregateSpec::new(GroupKey::Weathersit, Target::Registered, Reduction::Sum),
    )
    .into_vec()
    .into_iter()
    .map(|(code, registered)| WeatherTotal {
        code,
        label: weather_label(code),
        registered,
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Panel 2: weather vs registered users on working days
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherGroup {
    pub code: u8,
    pub label: String,
    /// Median annotation drawn above the box.
    pub median: f64,
    pub summary: BoxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherPanel {
    pub rows: usize,
    pub groups: Vec<WeatherGroup>,
}

pub fn weather_panel(daily: &Table, config: &ReportConfig) -> Result<WeatherPanel, FilterError> {
    let spec = FilterSpec::new()
        .date_from(config.weather_from)
        .date_until(config.weather_until)
        .workingday(true);
    let view = filter(daily, &spec)?;

    let medians = group_and_reduce(
        &view,
        &AggregateSpec::new(GroupKey::Weathersit, Target::Registered, Reduction::Median),
    );
    let groups = box_summaries(&view, GroupKey::Weathersit, Target::Registered)
        .into_iter()
        .filter_map(|(code, summary)| {
            Some(WeatherGroup {
                code,
                label: weather_label(code),
                median: medians.get(code)?,
                summary,
            })
        })
        .collect();

    Ok(WeatherPanel {
        rows: view.len(),
        groups,
    })
}

// ---------------------------------------------------------------------------
// Panel 3: windspeed vs total count on weekend hours
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindPanel {
    pub points: Vec<[f64; 2]>,
    /// Regression line; absent when the points cannot define one.
    pub fit: Option<LinearFit>,
}

pub fn wind_panel(hourly: &Table, config: &ReportConfig) -> Result<WindPanel, FilterError> {
    let spec = FilterSpec::new()
        .date_until(config.wind_until)
        .day_type(DayType::Weekend);
    let view = filter(hourly, &spec)?;
    let points = scatter_points(&view, Target::Windspeed, Target::Cnt);
    let fit = linear_fit(&points);
    Ok(WindPanel { points, fit })
}

// ---------------------------------------------------------------------------
// Whole report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub daily_rows: usize,
    pub hourly_rows: usize,
    pub visible_rows: usize,
    pub head: Vec<Record>,
    pub weather_totals: Vec<WeatherTotal>,
    pub weather: WeatherPanel,
    pub wind: WindPanel,
}

impl Report {
    /// Build the report from the loaded tables and the current daily view.
    pub fn build(
        daily: &Table,
        hourly: &Table,
        visible: &Table,
        config: &ReportConfig,
    ) -> Result<Self, FilterError> {
        Ok(Report {
            daily_rows: daily.len(),
            hourly_rows: hourly.len(),
            visible_rows: visible.len(),
            head: visible.head(config.head_rows).to_vec(),
            weather_totals: registered_by_weather(visible),
            weather: weather_panel(daily, config)?,
            wind: wind_panel(hourly, config)?,
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} daily / {} hourly records, {} daily rows visible",
            self.daily_rows, self.hourly_rows, self.visible_rows
        )?;

        writeln!(f, "\nFiltered data")?;
        if self.head.is_empty() {
            writeln!(f, "  (no data)")?;
        }
        for r in &self.head {
            writeln!(
                f,
                "  {}  {:<7} {:<16} workingday={}  registered={:>5}  cnt={:>5}",
                r.date,
                season_label(r.season),
                weather_label(r.weathersit),
                u8::from(r.workingday),
                r.registered,
                r.cnt
            )?;
        }

        writeln!(f, "\nRegistered users by weather, filtered data")?;
        if self.weather_totals.is_empty() {
            writeln!(f, "  (no data)")?;
        }
        for t in &self.weather_totals {
            writeln!(f, "  {:<16} {:>9}", t.label, t.registered as u64)?;
        }

        writeln!(
            f,
            "\nWeather vs registered users, working days ({} rows)",
            self.weather.rows
        )?;
        if self.weather.groups.is_empty() {
            writeln!(f, "  (no data)")?;
        }
        for g in &self.weather.groups {
            writeln!(
                f,
                "  {:<16} n={:<3} median={:<8} q1={:<8} q3={:<8} min={} max={}",
                g.label,
                g.summary.count,
                g.median as i64,
                g.summary.q1,
                g.summary.q3,
                g.summary.min,
                g.summary.max
            )?;
        }

        writeln!(
            f,
            "\nWindspeed vs total users, weekend hours ({} points)",
            self.wind.points.len()
        )?;
        match &self.wind.fit {
            Some(fit) => writeln!(
                f,
                "  cnt = {:.2} * windspeed + {:.2}  (r = {:.3})",
                fit.slope, fit.intercept, fit.r
            ),
            None => writeln!(f, "  (not enough data for a regression line)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;
    use crate::data::store::DatasetStore;

    const DAY: &str = "dteday,season,mnth,weekday,workingday,weathersit,windspeed,cnt,registered\n\
                       2011-01-03,1,1,1,1,1,0.25,1349,1229\n\
                       2011-01-04,1,1,2,1,1,0.19,1562,1454\n\
                       2011-01-05,1,1,3,1,2,0.25,1600,1518\n\
                       2011-01-08,1,1,6,0,1,0.27,959,891\n\
                       2012-01-03,1,1,2,1,1,0.35,2236,2121\n";
    const HOUR: &str = "dteday,hr,season,mnth,weekday,workingday,weathersit,windspeed,cnt,registered\n\
                        2011-01-01,0,1,1,6,0,1,0.0,16,13\n\
                        2011-01-01,1,1,1,6,0,1,0.1,40,32\n\
                        2011-01-02,0,1,1,0,0,2,0.2,17,16\n\
                        2011-01-03,0,1,1,1,1,1,0.3,5,4\n\
                        2011-01-08,0,1,1,6,0,1,0.4,25,20\n";

    fn store() -> DatasetStore {
        let day = read_csv("day", DAY.as_bytes()).unwrap();
        let hour = read_csv("hour", HOUR.as_bytes()).unwrap();
        DatasetStore::load(&day, &hour).unwrap()
    }

    #[test]
    fn weather_panel_uses_january_working_days() {
        let panel = weather_panel(&store().daily(), &ReportConfig::default()).unwrap();
        assert_eq!(panel.rows, 3);
        let codes: Vec<u8> = panel.groups.iter().map(|g| g.code).collect();
        assert_eq!(codes, vec![1, 2]);
        assert_eq!(panel.groups[0].median, 1341.5);
        assert_eq!(panel.groups[0].summary.median, 1341.5);
        assert_eq!(panel.groups[1].median, 1518.0);
        assert_eq!(panel.groups[0].label, "Clear");
    }

    #[test]
    fn registered_totals_cover_the_whole_view() {
        let totals = registered_by_weather(&store().daily());
        let pairs: Vec<(u8, f64)> = totals.iter().map(|t| (t.code, t.registered)).collect();
        assert_eq!(
            pairs,
            vec![(1, (1229 + 1454 + 891 + 2121) as f64), (2, 1518.0)]
        );
        assert_eq!(totals[1].label, "Mist");
        assert!(registered_by_weather(&Table::new(
            crate::data::model::Granularity::Daily,
            Vec::new()
        ))
        .is_empty());
    }

    #[test]
    fn wind_panel_uses_first_week_weekends() {
        let panel = wind_panel(&store().hourly(), &ReportConfig::default()).unwrap();
        assert_eq!(panel.points, vec![[0.0, 16.0], [0.1, 40.0], [0.2, 17.0]]);
        assert!(panel.fit.is_some());
    }

    #[test]
    fn report_renders_every_section() {
        let s = store();
        let daily = s.daily();
        let report =
            Report::build(&daily, &s.hourly(), &daily, &ReportConfig::default()).unwrap();
        assert_eq!(report.head.len(), 5);
        let text = report.to_string();
        assert!(text.contains("5 daily / 5 hourly records"));
        assert!(text.contains("Registered users by weather"));
        assert!(text.contains("5695"));
        assert!(text.contains("Clear"));
        assert!(text.contains("cnt = "));
    }

    #[test]
    fn empty_view_renders_placeholder() {
        let s = store();
        let empty = Table::new(crate::data::model::Granularity::Daily, Vec::new());
        let report =
            Report::build(&s.daily(), &s.hourly(), &empty, &ReportConfig::default()).unwrap();
        assert!(report.to_string().contains("(no data)"));
    }

    #[test]
    fn labels_fall_back_to_codes() {
        assert_eq!(weather_label(3), "Light rain/snow");
        assert_eq!(season_label(9), "season 9");
    }
}
