use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Row id assigned by the store.
pub type RecordId = i64;

/// Id of a dimension row (technician, client or task type).
pub type DimensionId = i64;

/// The three lookup tables referenced by every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Technician,
    Client,
    TaskType,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Technician, Dimension::Client, Dimension::TaskType];

    /// Backing table name in the store.
    pub fn table(&self) -> &'static str {
        match self {
            Dimension::Technician => "technicians",
            Dimension::Client => "clients",
            Dimension::TaskType => "task_types",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Technician => write!(f, "Technician"),
            Dimension::Client => write!(f, "Client"),
            Dimension::TaskType => write!(f, "TaskType"),
        }
    }
}

/// A normalized upload row. Names are still names; ids are resolved during
/// ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRecord {
    pub date: NaiveDate,
    pub technician: String,
    pub client: String,
    pub task_type: String,
    pub completion_mode: Option<String>,
    pub ticket_number: Option<String>,
    pub hours: f64,
    pub description: Option<String>,
    /// 1-12, or 0 when the month cell could not be read.
    pub month: i64,
}

impl TimeRecord {
    pub fn name_for(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Technician => &self.technician,
            Dimension::Client => &self.client,
            Dimension::TaskType => &self.task_type,
        }
    }
}

/// A fact row ready for insertion, dimension names replaced by ids.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord<'a> {
    pub date: NaiveDate,
    pub technician_id: DimensionId,
    pub client_id: DimensionId,
    pub task_type_id: DimensionId,
    pub completion_mode: Option<&'a str>,
    pub ticket_number: Option<&'a str>,
    pub hours: f64,
    pub description: Option<&'a str>,
    pub month: i64,
}

impl<'a> NewRecord<'a> {
    pub fn from_record(
        record: &'a TimeRecord,
        technician_id: DimensionId,
        client_id: DimensionId,
        task_type_id: DimensionId,
    ) -> Self {
        Self {
            date: record.date,
            technician_id,
            client_id,
            task_type_id,
            completion_mode: record.completion_mode.as_deref(),
            ticket_number: record.ticket_number.as_deref(),
            hours: record.hours,
            description: record.description.as_deref(),
            month: record.month,
        }
    }
}

/// One row of the joined view: a stored record with dimension names in
/// place of their ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub id: RecordId,
    pub date: NaiveDate,
    pub technician: String,
    pub client: String,
    pub task_type: String,
    pub completion_mode: Option<String>,
    pub ticket_number: Option<String>,
    pub hours: f64,
    pub description: Option<String>,
    pub month: i64,
}
