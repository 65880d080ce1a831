//! Table definitions for the timesheet database.
//!
//! ```text
//! technicians(id, name UNIQUE)
//! clients(id, name UNIQUE)
//! task_types(id, name UNIQUE)
//! records(id, date, technician_id -> technicians, client_id -> clients,
//!         task_type_id -> task_types, completion_mode, ticket_number,
//!         hours >= 0, description, month)
//! ```

use rusqlite::Connection;
use timesheet_core::Dimension;

fn dimension_ddl(dimension: Dimension) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );",
        dimension.table()
    )
}

const RECORDS_DDL: &str = "
    CREATE TABLE IF NOT EXISTS records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        technician_id INTEGER NOT NULL,
        client_id INTEGER NOT NULL,
        task_type_id INTEGER NOT NULL,
        completion_mode TEXT,
        ticket_number TEXT,
        hours REAL NOT NULL CHECK (hours >= 0),
        description TEXT,
        month INTEGER NOT NULL,
        FOREIGN KEY (technician_id) REFERENCES technicians(id),
        FOREIGN KEY (client_id) REFERENCES clients(id),
        FOREIGN KEY (task_type_id) REFERENCES task_types(id)
    );";

/// Create every table that does not exist yet. Safe to run on each start.
pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    let mut ddl = String::new();
    for dimension in Dimension::ALL {
        ddl.push_str(&dimension_ddl(dimension));
    }
    ddl.push_str(RECORDS_DDL);
    conn.execute_batch(&ddl)
}
