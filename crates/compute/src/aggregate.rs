use std::collections::BTreeMap;

use serde::Serialize;
use timesheet_core::{Dimension, JoinedRecord};

/// Summed hours for one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total_hours: f64,
}

/// Summed hours for one month number, with its display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: i64,
    pub label: String,
    pub total_hours: f64,
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English name for months 1-12, `None` otherwise.
pub fn month_name(month: i64) -> Option<&'static str> {
    usize::try_from(month)
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|idx| MONTH_NAMES.get(idx).copied())
}

/// Sum hours per value of `dimension`, ordered by key.
pub fn summary_by(records: &[JoinedRecord], dimension: Dimension) -> Vec<GroupTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        let key = match dimension {
            Dimension::Technician => record.technician.as_str(),
            Dimension::Client => record.client.as_str(),
            Dimension::TaskType => record.task_type.as_str(),
        };
        *totals.entry(key).or_insert(0.0) += record.hours;
    }

    totals
        .into_iter()
        .map(|(key, total_hours)| GroupTotal {
            key: key.to_string(),
            total_hours,
        })
        .collect()
}

pub fn summary_by_technician(records: &[JoinedRecord]) -> Vec<GroupTotal> {
    summary_by(records, Dimension::Technician)
}

pub fn summary_by_client(records: &[JoinedRecord]) -> Vec<GroupTotal> {
    summary_by(records, Dimension::Client)
}

pub fn summary_by_task_type(records: &[JoinedRecord]) -> Vec<GroupTotal> {
    summary_by(records, Dimension::TaskType)
}

/// Sum hours per month number. Months outside 1-12 keep their number as
/// the label.
pub fn summary_by_month(records: &[JoinedRecord]) -> Vec<MonthTotal> {
    let mut totals: BTreeMap<i64, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.month).or_insert(0.0) += record.hours;
    }

    totals
        .into_iter()
        .map(|(month, total_hours)| MonthTotal {
            month,
            label: month_name(month)
                .map(str::to_string)
                .unwrap_or_else(|| month.to_string()),
            total_hours,
        })
        .collect()
}
