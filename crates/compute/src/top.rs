use std::collections::BTreeMap;

use serde::Serialize;
use timesheet_core::JoinedRecord;
use tracing::debug;

use crate::aggregate::{summary_by_technician, GroupTotal};

pub const DEFAULT_TOP_N: usize = 5;

/// Hours one top technician spent on one client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientBreakdown {
    pub technician: String,
    pub client: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopTechnicians {
    /// Highest totals first.
    pub ranked: Vec<GroupTotal>,
    /// Per-client hours for each ranked technician, in ranking order then
    /// client order.
    pub breakdown: Vec<ClientBreakdown>,
}

/// Rank technicians by total hours and split each of the top `n` by client.
///
/// Ties keep alphabetical order.
pub fn top_technicians_with_client_breakdown(records: &[JoinedRecord], n: usize) -> TopTechnicians {
    let mut ranked = summary_by_technician(records);
    // sort_by is stable, so equal totals stay in key order.
    ranked.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));
    ranked.truncate(n);

    let mut breakdown = Vec::new();
    for technician in &ranked {
        let mut per_client: BTreeMap<&str, f64> = BTreeMap::new();
        for record in records.iter().filter(|r| r.technician == technician.key) {
            *per_client.entry(record.client.as_str()).or_insert(0.0) += record.hours;
        }
        breakdown.extend(per_client.into_iter().map(|(client, hours)| ClientBreakdown {
            technician: technician.key.clone(),
            client: client.to_string(),
            hours,
        }));
    }

    debug!(
        technicians = ranked.len(),
        breakdown_rows = breakdown.len(),
        "top technicians computed"
    );
    TopTechnicians { ranked, breakdown }
}
