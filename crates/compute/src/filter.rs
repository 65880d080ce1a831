use std::collections::BTreeSet;

use serde::Serialize;
use timesheet_core::JoinedRecord;

/// Equality filters over the joined view. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub technician: Option<String>,
    pub client: Option<String>,
    pub task_type: Option<String>,
    pub month: Option<i64>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.technician.is_none()
            && self.client.is_none()
            && self.task_type.is_none()
            && self.month.is_none()
    }

    pub fn matches(&self, record: &JoinedRecord) -> bool {
        fn eq(wanted: &Option<String>, actual: &str) -> bool {
            wanted.as_deref().map_or(true, |w| w == actual)
        }

        eq(&self.technician, &record.technician)
            && eq(&self.client, &record.client)
            && eq(&self.task_type, &record.task_type)
            && self.month.map_or(true, |m| m == record.month)
    }

    pub fn apply<'a>(&self, records: &'a [JoinedRecord]) -> Vec<&'a JoinedRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Owned copy of the matching records, for feeding the summaries.
    pub fn apply_owned(&self, records: &[JoinedRecord]) -> Vec<JoinedRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Distinct values available for each filter, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub technicians: Vec<String>,
    pub clients: Vec<String>,
    pub task_types: Vec<String>,
    pub months: Vec<i64>,
}

impl FilterOptions {
    pub fn from_records(records: &[JoinedRecord]) -> Self {
        let mut technicians = BTreeSet::new();
        let mut clients = BTreeSet::new();
        let mut task_types = BTreeSet::new();
        let mut months = BTreeSet::new();

        for record in records {
            technicians.insert(record.technician.as_str());
            clients.insert(record.client.as_str());
            task_types.insert(record.task_type.as_str());
            months.insert(record.month);
        }

        let owned = |set: BTreeSet<&str>| set.into_iter().map(str::to_string).collect();
        Self {
            technicians: owned(technicians),
            clients: owned(clients),
            task_types: owned(task_types),
            months: months.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::record;

    fn sample() -> Vec<JoinedRecord> {
        vec![
            record("Ana", "Acme", "Support", 1.0, 3),
            record("Luis", "Acme", "Install", 2.0, 4),
            record("Ana", "Globex", "Install", 4.0, 4),
        ]
    }

    #[test]
    fn empty_filter_matches_all() {
        let filter = RecordFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&sample()).len(), 3);
    }

    #[test]
    fn all_set_fields_must_match() {
        let records = sample();
        let filter = RecordFilter {
            technician: Some("Ana".into()),
            task_type: Some("Install".into()),
            ..Default::default()
        };
        let hits = filter.apply(&records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].client, "Globex");

        let by_month = RecordFilter {
            month: Some(4),
            ..Default::default()
        };
        let owned = by_month.apply_owned(&records);
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|r| r.month == 4));
    }

    #[test]
    fn match_is_exact() {
        let filter = RecordFilter {
            client: Some("acme".into()),
            ..Default::default()
        };
        assert!(filter.apply(&sample()).is_empty());
    }

    #[test]
    fn options_are_sorted_and_distinct() {
        let options = FilterOptions::from_records(&sample());
        assert_eq!(options.technicians, vec!["Ana", "Luis"]);
        assert_eq!(options.clients, vec!["Acme", "Globex"]);
        assert_eq!(options.task_types, vec!["Install", "Support"]);
        assert_eq!(options.months, vec![3, 4]);
        assert_eq!(FilterOptions::from_records(&[]), FilterOptions::default());
    }
}
