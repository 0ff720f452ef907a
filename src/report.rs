use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::InstanceError;

/// Either a measured duration in milliseconds or the literal `timeout`
/// sentinel written by the outer driver when a run exceeds its wall-clock
/// budget.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    Millis(f64),
    Timeout(TimeoutTag),
}

/// A unit-like tag so `TimeValue::Timeout` serializes as the bare string
/// `"timeout"` rather than an object, matching the CSV contract.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TimeoutTag {
    #[serde(rename = "timeout")]
    Timeout,
}

impl TimeValue {
    pub fn timeout() -> TimeValue {
        TimeValue::Timeout(TimeoutTag::Timeout)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TimeValue::Timeout(_))
    }

    pub fn millis(&self) -> Option<f64> {
        match self {
            TimeValue::Millis(v) => Some(*v),
            TimeValue::Timeout(_) => None,
        }
    }
}

/// One row of the results CSV: `instance,n,iseq,type,algo,time`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub instance: String,
    pub n: usize,
    pub iseq: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub algo: String,
    pub time: TimeValue,
}

/// The statistics produced for one `(n, iseq, type, algo)` group that
/// contains no timeout row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub n: usize,
    pub iseq: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub algo: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

type GroupKey = (usize, bool, String, String);

fn group_key(row: &ResultRow) -> GroupKey {
    (row.n, row.iseq, row.kind.clone(), row.algo.clone())
}

/// Groups by `(n, iseq, type, algo)`; any group containing a `timeout` row
/// is dropped entirely (the "Timeout aggregation law" — a single timeout
/// makes the whole group's aggregate meaningless, so none of its other
/// measurements are reported either).
pub fn aggregate(rows: &[ResultRow]) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    let mut timed_out: std::collections::HashSet<GroupKey> = std::collections::HashSet::new();

    for row in rows {
        let key = group_key(row);
        match row.time {
            TimeValue::Millis(ms) => groups.entry(key).or_default().push(ms),
            TimeValue::Timeout(_) => {
                timed_out.insert(key);
            }
        }
    }

    groups
        .into_iter()
        .filter(|(key, _)| !timed_out.contains(key))
        .map(|((n, iseq, kind, algo), mut times)| {
            times.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let count = times.len();
            let min = times[0];
            let max = times[count - 1];
            let mean = times.iter().sum::<f64>() / count as f64;
            let median = if count % 2 == 0 {
                (times[count / 2 - 1] + times[count / 2]) / 2.0
            } else {
                times[count / 2]
            };
            let variance = times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / count as f64;
            let std = variance.sqrt();

            AggregateRow {
                n,
                iseq,
                kind,
                algo,
                count,
                min,
                max,
                mean,
                median,
                std,
            }
        })
        .collect()
}

pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<ResultRow>, InstanceError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

pub fn write_aggregate(rows: &[AggregateRow], path: impl AsRef<Path>) -> Result<(), InstanceError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
