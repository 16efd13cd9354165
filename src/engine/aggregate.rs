use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::stats::{mean, median};
use crate::data::model::{Record, Table};

// ---------------------------------------------------------------------------
// AggregateSpec
// ---------------------------------------------------------------------------

/// Categorical field to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    Season,
    Weathersit,
    Month,
    Weekday,
    Workingday,
    Holiday,
    Hour,
}

impl GroupKey {
    /// Raw code of this field; `None` for `Hour` on daily rows.
    pub fn value(self, record: &Record) -> Option<u8> {
        match self {
            GroupKey::Season => Some(record.season),
            GroupKey::Weathersit => Some(record.weathersit),
            GroupKey::Month => Some(record.month),
            GroupKey::Weekday => Some(record.weekday),
            GroupKey::Workingday => Some(u8::from(record.workingday)),
            GroupKey::Holiday => Some(u8::from(record.holiday)),
            GroupKey::Hour => record.hour,
        }
    }
}

/// Numeric field to reduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Cnt,
    Registered,
    Casual,
    Windspeed,
}

impl Target {
    /// `None` when the source had no `casual` column.
    pub fn value(self, record: &Record) -> Option<f64> {
        match self {
            Target::Cnt => Some(f64::from(record.cnt)),
            Target::Registered => Some(f64::from(record.registered)),
            Target::Casual => record.casual.map(f64::from),
            Target::Windspeed => Some(record.windspeed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reduction {
    Sum,
    /// Average of the two middle values for even-sized groups.
    Median,
    Mean,
    /// Number of rows in the group; the target only decides which rows count.
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub group_key: GroupKey,
    pub target: Target,
    pub reduction: Reduction,
}

impl AggregateSpec {
    pub fn new(group_key: GroupKey, target: Target, reduction: Reduction) -> Self {
        AggregateSpec {
            group_key,
            target,
            reduction,
        }
    }
}

// ---------------------------------------------------------------------------
// GroupSummary – category → scalar, in first-appearance order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    groups: Vec<(u8, f64)>,
}

impl GroupSummary {
    pub fn get(&self, key: u8) -> Option<f64> {
        self.groups
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.groups.iter().copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.groups.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_vec(self) -> Vec<(u8, f64)> {
        self.groups
    }
}

/// Collect the target values of each group, groups ordered by the position of
/// their first member. Rows lacking the key or the target are skipped.
pub fn group_values(table: &Table, key: GroupKey, target: Target) -> Vec<(u8, Vec<f64>)> {
    let mut positions: HashMap<u8, usize> = HashMap::new();
    let mut groups: Vec<(u8, Vec<f64>)> = Vec::new();

    for record in table {
        let (Some(k), Some(v)) = (key.value(record), target.value(record)) else {
            continue;
        };
        let idx = *positions.entry(k).or_insert_with(|| {
            groups.push((k, Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(v);
    }
    groups
}

/// Group `table` by `spec.group_key` and reduce `spec.target` within each group.
///
/// Only groups with at least one row are emitted. Category codes outside the
/// declared sets are grouped under their observed value.
pub fn group_and_reduce(table: &Table, spec: &AggregateSpec) -> GroupSummary {
    let groups: Vec<(u8, f64)> = group_values(table, spec.group_key, spec.target)
        .into_iter()
        .filter_map(|(k, mut values)| {
            let v = match spec.reduction {
                Reduction::Sum => values.iter().sum::<f64>(),
                Reduction::Median => median(&mut values)?,
                Reduction::Mean => mean(&values)?,
                Reduction::Count => values.len() as f64,
            };
            Some((k, v))
        })
        .collect();

    log::debug!(
        "group {:?} by {:?} ({:?}): {} rows -> {} groups",
        spec.target,
        spec.group_key,
        spec.reduction,
        table.len(),
        groups.len()
    );
    GroupSummary { groups }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::Granularity;

    fn rec(season: u8, cnt: u32) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
            hour: None,
            month: 1,
            season,
            weathersit: 1,
            holiday: false,
            workingday: true,
            weekday: 1,
            windspeed: 0.1,
            casual: None,
            registered: cnt,
            cnt,
        }
    }

    fn table(rows: &[(u8, u32)]) -> Table {
        Table::new(
            Granularity::Daily,
            rows.iter().map(|&(s, c)| rec(s, c)).collect(),
        )
    }

    #[test]
    fn sum_per_group() {
        let t = table(&[(1, 10), (1, 5), (2, 3)]);
        let spec = AggregateSpec::new(GroupKey::Season, Target::Cnt, Reduction::Sum);
        let out = group_and_reduce(&t, &spec);
        assert_eq!(out.into_vec(), vec![(1, 15.0), (2, 3.0)]);
    }

    #[test]
    fn median_even_and_odd_groups() {
        let t = table(&[(1, 40), (2, 25), (1, 10), (1, 30), (2, 5), (1, 20), (2, 15)]);
        let spec = AggregateSpec::new(GroupKey::Season, Target::Registered, Reduction::Median);
        let out = group_and_reduce(&t, &spec);
        assert_eq!(out.get(1), Some(25.0));
        assert_eq!(out.get(2), Some(15.0));
    }

    #[test]
    fn groups_follow_first_appearance() {
        let t = table(&[(3, 1), (1, 1), (3, 1), (7, 1), (1, 1)]);
        let spec = AggregateSpec::new(GroupKey::Season, Target::Cnt, Reduction::Count);
        let out = group_and_reduce(&t, &spec);
        assert_eq!(out.keys().collect::<Vec<_>>(), vec![3, 1, 7]);
        assert_eq!(out.get(3), Some(2.0));
        assert_eq!(out.get(7), Some(1.0));
    }

    #[test]
    fn empty_table_gives_empty_summary() {
        let spec = AggregateSpec::new(GroupKey::Season, Target::Cnt, Reduction::Sum);
        let out = group_and_reduce(&table(&[]), &spec);
        assert!(out.is_empty());
    }

    #[test]
    fn rows_without_target_are_skipped() {
        let mut t = vec![rec(1, 10), rec(1, 20)];
        t[0].casual = Some(4);
        let t = Table::new(Granularity::Daily, t);
        let spec = AggregateSpec::new(GroupKey::Season, Target::Casual, Reduction::Mean);
        let out = group_and_reduce(&t, &spec);
        assert_eq!(out.into_vec(), vec![(1, 4.0)]);
    }

    #[test]
    fn flag_keys_group_as_zero_and_one() {
        let mut rows = vec![rec(1, 10), rec(1, 20), rec(1, 5), rec(1, 7)];
        rows[1].workingday = false;
        rows[3].workingday = false;
        rows[3].holiday = true;
        let t = Table::new(Granularity::Daily, rows);

        let spec = AggregateSpec::new(GroupKey::Workingday, Target::Cnt, Reduction::Sum);
        assert_eq!(group_and_reduce(&t, &spec).into_vec(), vec![(1, 15.0), (0, 27.0)]);

        let spec = AggregateSpec::new(GroupKey::Holiday, Target::Cnt, Reduction::Count);
        assert_eq!(group_and_reduce(&t, &spec).into_vec(), vec![(0, 3.0), (1, 1.0)]);
    }

    #[test]
    fn hour_key_skips_daily_rows() {
        let spec = AggregateSpec::new(GroupKey::Hour, Target::Cnt, Reduction::Sum);
        assert!(group_and_reduce(&table(&[(1, 10)]), &spec).is_empty());
    }
}
