//! End-to-end: load, filter by the sidebar selections, annotate medians.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use bikeshare_dash::config::ReportConfig;
use bikeshare_dash::data::loader::read_csv;
use bikeshare_dash::report::{registered_by_weather, Report};
use bikeshare_dash::{
    filter, group_and_reduce, AggregateSpec, DashboardState, DatasetStore, FilterError,
    FilterSpec, GroupKey, Reduction, Season, Target, Weather,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

// January 2011 working days; weathersit 1, 2 and 3. One February row.
const DAY: &str = "\
dteday,season,mnth,holiday,weekday,workingday,weathersit,windspeed,casual,registered,cnt
2011-01-03,1,1,0,1,1,1,0.248309,120,1229,1349
2011-01-04,1,1,0,2,1,1,0.160296,108,1454,1562
2011-01-05,1,1,0,3,1,1,0.186900,82,1518,1600
2011-01-06,1,1,0,4,1,1,0.089565,88,1518,1606
2011-01-07,1,1,0,5,1,2,0.168726,148,1362,1510
2011-01-10,1,1,0,1,1,2,0.232954,41,1280,1321
2011-01-11,1,1,0,2,1,3,0.171970,43,1220,1263
2011-01-12,1,1,0,3,1,1,0.304627,25,1137,1162
2011-02-01,1,2,0,2,1,2,0.187192,47,1360,1360
";

const HOUR: &str = "\
dteday,season,mnth,hr,holiday,weekday,workingday,weathersit,windspeed,casual,registered,cnt
2011-01-01,1,1,0,0,6,0,1,0.0,3,13,16
2011-01-01,1,1,1,0,6,0,1,0.0,8,32,40
2011-01-01,1,1,5,0,6,0,2,0.0896,0,1,1
2011-01-02,1,1,0,0,0,0,2,0.1642,4,13,17
2011-01-02,1,1,14,0,0,0,2,0.3582,12,55,67
2011-01-03,1,1,0,0,1,1,1,0.1940,0,5,5
";

fn store() -> DatasetStore {
    let day = read_csv("day.csv", DAY.as_bytes()).unwrap();
    let hour = read_csv("hour.csv", HOUR.as_bytes()).unwrap();
    DatasetStore::load(&day, &hour).unwrap()
}

#[test]
fn january_medians_per_weather_condition() -> TestResult {
    let daily = store().daily();
    let spec = FilterSpec::new()
        .months(1, 1)
        .weather([Weather::Clear, Weather::Mist, Weather::LightPrecipitation]);
    let view = filter(&daily, &spec)?;
    assert_eq!(view.len(), 8);

    let medians = group_and_reduce(
        &view,
        &AggregateSpec::new(GroupKey::Weathersit, Target::Registered, Reduction::Median),
    );
    // weathersit 1: 1137 1229 1454 1518 1518 -> 1454
    // weathersit 2: 1280 1362             -> 1321
    // weathersit 3: 1220                  -> 1220
    assert_eq!(
        medians.into_vec(),
        vec![(1, 1454.0), (2, 1321.0), (3, 1220.0)]
    );
    Ok(())
}

#[test]
fn sum_of_registered_by_weather() -> TestResult {
    let daily = store().daily();
    let view = filter(&daily, &FilterSpec::new().season_codes(&[1])?)?;
    let sums = group_and_reduce(
        &view,
        &AggregateSpec::new(GroupKey::Weathersit, Target::Registered, Reduction::Sum),
    );
    assert_eq!(sums.get(1), Some((1229 + 1454 + 1518 + 1518 + 1137) as f64));
    assert_eq!(sums.get(2), Some((1362 + 1280 + 1360) as f64));
    assert_eq!(sums.get(4), None);
    Ok(())
}

#[test]
fn sidebar_session() -> TestResult {
    let mut state = DashboardState::new(store())?;
    assert_eq!(state.visible().len(), 9);

    state.set_months(2, 2)?;
    assert_eq!(state.visible().len(), 1);

    // Rejected input: previous selection survives.
    let err = state.set_months(3, 1).unwrap_err();
    assert!(matches!(err, FilterError::InvalidRange { field: "month", .. }));
    assert_eq!(state.filters().months, Some((2, 2)));
    assert_eq!(state.visible().len(), 1);

    state.set_months(1, 2)?;
    state.toggle_weather(Weather::Clear)?;
    assert_eq!(state.visible().len(), 4);

    state.select_no_seasons()?;
    assert!(state.visible().is_empty());
    state.toggle_season(Season::Spring)?;
    assert_eq!(state.visible().len(), 4);
    Ok(())
}

#[test]
fn registered_totals_follow_the_sidebar() -> TestResult {
    let mut state = DashboardState::new(store())?;
    let totals = |state: &DashboardState| -> Vec<(u8, f64)> {
        registered_by_weather(&state.visible())
            .into_iter()
            .map(|t| (t.code, t.registered))
            .collect()
    };
    assert_eq!(
        totals(&state),
        vec![(1, 6856.0), (2, 4002.0), (3, 1220.0)]
    );

    state.toggle_weather(Weather::Mist)?;
    assert_eq!(totals(&state), vec![(1, 6856.0), (3, 1220.0)]);

    state.set_months(2, 2)?;
    assert!(totals(&state).is_empty());

    state.toggle_weather(Weather::Mist)?;
    assert_eq!(totals(&state), vec![(2, 1360.0)]);

    let report = Report::build(
        &state.store().daily(),
        &state.store().hourly(),
        &state.visible(),
        &ReportConfig::default(),
    )?;
    assert_eq!(report.weather_totals.len(), 1);
    assert_eq!(report.weather_totals[0].label, "Mist");
    Ok(())
}

#[test]
fn report_over_the_fixture() -> TestResult {
    let store = store();
    let state = DashboardState::new(store.clone())?;
    let report = Report::build(
        &store.daily(),
        &store.hourly(),
        &state.visible(),
        &ReportConfig::default(),
    )?;

    assert_eq!(report.head.len(), 5);
    assert_eq!(report.weather.rows, 8);
    assert_eq!(report.weather.groups.len(), 3);
    assert_eq!(report.weather_totals.len(), 3);

    // Weekend hours on 2011-01-01 (Sat) and 2011-01-02 (Sun).
    assert_eq!(report.wind.points.len(), 5);
    let fit = report.wind.fit.expect("regression line");
    assert_eq!(fit.n, 5);
    assert!(fit.slope > 0.0);
    Ok(())
}
