use serde::Serialize;
use timesheet_core::{CellValue, RawTable, TimeRecord, TimesheetError};
use tracing::{debug, info};

use crate::parse::{parse_date, parse_hours, parse_month};

pub const COL_DATE: &str = "Date";
pub const COL_TECHNICIAN: &str = "Technician";
pub const COL_CLIENT: &str = "Client";
pub const COL_TASK_TYPE: &str = "Task Type";
pub const COL_COMPLETION_MODE: &str = "Task Completed As:";
pub const COL_TICKET_NUMBER: &str = "Ticket Number";
pub const COL_TIME: &str = "Time:";
pub const COL_DESCRIPTION: &str = "Brief Description";
pub const COL_MONTH: &str = "Month";

/// Headers every upload must carry, checked in this order.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_DATE,
    COL_TECHNICIAN,
    COL_CLIENT,
    COL_TASK_TYPE,
    COL_COMPLETION_MODE,
    COL_TICKET_NUMBER,
    COL_TIME,
    COL_DESCRIPTION,
    COL_MONTH,
];

/// Column positions of the required headers within one upload.
struct ColumnMap {
    date: usize,
    technician: usize,
    client: usize,
    task_type: usize,
    completion_mode: usize,
    ticket_number: usize,
    time: usize,
    description: usize,
    month: usize,
}

impl ColumnMap {
    /// Fields resolve in declared order, so the first absent header in
    /// [`REQUIRED_COLUMNS`] is the one reported.
    fn resolve(table: &RawTable) -> Result<Self, TimesheetError> {
        Ok(Self {
            date: table.require_column(COL_DATE)?,
            technician: table.require_column(COL_TECHNICIAN)?,
            client: table.require_column(COL_CLIENT)?,
            task_type: table.require_column(COL_TASK_TYPE)?,
            completion_mode: table.require_column(COL_COMPLETION_MODE)?,
            ticket_number: table.require_column(COL_TICKET_NUMBER)?,
            time: table.require_column(COL_TIME)?,
            description: table.require_column(COL_DESCRIPTION)?,
            month: table.require_column(COL_MONTH)?,
        })
    }
}

/// Why a row did not make it into the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    MissingDate,
    MissingTechnician,
    MissingClient,
    MissingTaskType,
    MissingHours,
}

/// Output of [`Normalizer::normalize`]: the rows that survived plus counts.
/// Also serves as the preview shown before committing an upload.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedBatch {
    pub records: Vec<TimeRecord>,
    pub total_rows: usize,
    pub dropped_rows: usize,
}

pub struct Normalizer;

impl Normalizer {
    /// Validate headers, coerce every row and drop incomplete ones.
    ///
    /// A missing required column fails the whole batch. Unreadable hours or
    /// months never fail; they fall back to `0`.
    pub fn normalize(table: &RawTable) -> Result<NormalizedBatch, TimesheetError> {
        let cols = ColumnMap::resolve(table)?;

        let mut batch = NormalizedBatch {
            records: Vec::with_capacity(table.len()),
            total_rows: table.len(),
            dropped_rows: 0,
        };

        for row in 0..table.len() {
            match Self::normalize_row(table, &cols, row) {
                Ok(record) => batch.records.push(record),
                Err(reason) => {
                    debug!(row = row + 2, ?reason, "row dropped");
                    batch.dropped_rows += 1;
                }
            }
        }

        info!(
            "Normalized {} of {} rows ({} dropped)",
            batch.records.len(),
            batch.total_rows,
            batch.dropped_rows
        );
        Ok(batch)
    }

    fn normalize_row(
        table: &RawTable,
        cols: &ColumnMap,
        row: usize,
    ) -> Result<TimeRecord, RowRejection> {
        let date = parse_date(table.cell(row, cols.date)).ok_or(RowRejection::MissingDate)?;
        let technician = table
            .cell(row, cols.technician)
            .to_text()
            .ok_or(RowRejection::MissingTechnician)?;
        let client = table
            .cell(row, cols.client)
            .to_text()
            .ok_or(RowRejection::MissingClient)?;
        let task_type = table
            .cell(row, cols.task_type)
            .to_text()
            .ok_or(RowRejection::MissingTaskType)?;

        let time_cell = table.cell(row, cols.time);
        let hours = parse_hours(time_cell).ok_or(RowRejection::MissingHours)?;
        if hours == 0.0 && matches!(time_cell, CellValue::Text(_)) {
            debug!(row = row + 2, value = %time_cell, "time cell read as 0 hours");
        }

        let month_cell = table.cell(row, cols.month);
        let month = parse_month(month_cell);
        if month == 0 && !month_cell.is_blank() {
            debug!(row = row + 2, value = %month_cell, "month cell read as unknown (0)");
        }

        Ok(TimeRecord {
            date,
            technician,
            client,
            task_type,
            completion_mode: table.cell(row, cols.completion_mode).to_text(),
            ticket_number: table.cell(row, cols.ticket_number).to_text(),
            hours,
            description: table.cell(row, cols.description).to_text(),
            month,
        })
    }
}
