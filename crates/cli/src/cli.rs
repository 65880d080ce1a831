use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use timesheet_ingest::UploadFormat;

/// Support-team timesheet store.
///
/// Imports spreadsheet exports into a local SQLite database and reports
/// hours per technician, client, task type and month.
#[derive(Parser, Debug)]
#[command(name = "timesheet", version, about = "Timesheet ingestion and reporting")]
pub struct CliArgs {
    /// SQLite database file (overrides DATABASE_PATH from the environment)
    #[arg(long, global = true, env = "TIMESHEET_DATABASE")]
    pub database: Option<PathBuf>,

    /// Print JSON instead of text tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database and tables if they do not exist
    Init,
    /// Normalize an upload and store its rows
    Import(ImportArgs),
    /// List stored records
    Records(RecordsArgs),
    /// Total hours grouped by one field
    Summary(SummaryArgs),
    /// Technicians with the most hours, split by client
    Top(TopArgs),
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Spreadsheet export (.xlsx, .csv, .tsv or .parquet)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Upload format (inferred from the extension if not set)
    #[arg(long)]
    pub format: Option<UploadFormat>,

    /// Show the normalized rows without writing them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Default)]
pub struct RecordsArgs {
    #[arg(long)]
    pub technician: Option<String>,

    #[arg(long)]
    pub client: Option<String>,

    #[arg(long)]
    pub task_type: Option<String>,

    #[arg(long)]
    pub month: Option<i64>,

    /// List the values available for each filter instead of records
    #[arg(long)]
    pub options: bool,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[arg(long, value_enum)]
    pub by: SummaryBy,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummaryBy {
    Technician,
    Client,
    TaskType,
    Month,
}

#[derive(Args, Debug)]
pub struct TopArgs {
    /// Number of technicians (defaults to REPORT_TOP_N)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_import_with_global_flags() {
        let args = CliArgs::try_parse_from([
            "timesheet",
            "--json",
            "import",
            "hours.pq",
            "--format",
            "parquet",
            "--dry-run",
            "--database",
            "/tmp/t.db",
        ])
        .unwrap();

        assert!(args.json);
        assert_eq!(args.database, Some(PathBuf::from("/tmp/t.db")));
        match args.command {
            Command::Import(import) => {
                assert_eq!(import.file, PathBuf::from("hours.pq"));
                assert_eq!(import.format, Some(UploadFormat::Parquet));
                assert!(import.dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn summary_accepts_kebab_case_field() {
        let args = CliArgs::try_parse_from(["timesheet", "summary", "--by", "task-type"]).unwrap();
        match args.command {
            Command::Summary(summary) => assert_eq!(summary.by, SummaryBy::TaskType),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn records_filters() {
        let args = CliArgs::try_parse_from([
            "timesheet",
            "records",
            "--technician",
            "Ana",
            "--month",
            "3",
        ])
        .unwrap();
        match args.command {
            Command::Records(records) => {
                assert_eq!(records.technician.as_deref(), Some("Ana"));
                assert_eq!(records.month, Some(3));
                assert!(!records.options);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result =
            CliArgs::try_parse_from(["timesheet", "import", "hours.csv", "--format", "docx"]);
        assert!(result.is_err());
    }

    #[test]
    fn workbook_format_is_accepted() {
        let args =
            CliArgs::try_parse_from(["timesheet", "import", "hours.bin", "--format", "xlsx"])
                .unwrap();
        match args.command {
            Command::Import(import) => assert_eq!(import.format, Some(UploadFormat::Xlsx)),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
