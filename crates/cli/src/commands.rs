use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use timesheet_compute::{
    summary_by_client, summary_by_month, summary_by_task_type, summary_by_technician,
    top_technicians_with_client_breakdown, FilterOptions, GroupTotal, MonthTotal, RecordFilter,
};
use timesheet_core::{Config, Dimension, JoinedRecord, TimeRecord};
use timesheet_ingest::{IngestPipeline, IngestReport, NormalizedBatch};
use timesheet_storage::SqliteStore;

use crate::cli::{Command, ImportArgs, RecordsArgs, SummaryArgs, SummaryBy, TopArgs};
use crate::terminal::{format_hours, Terminal};

/// Row counts shown after `init`.
#[derive(Debug, Serialize)]
struct StoreStatus {
    database: String,
    records: i64,
    technicians: usize,
    clients: usize,
    task_types: usize,
}

pub fn run(
    command: Command,
    store: SqliteStore,
    config: &Config,
    terminal: &Terminal,
) -> Result<()> {
    match command {
        Command::Init => run_init(&store, terminal),
        Command::Import(args) => run_import(args, store, config, terminal),
        Command::Records(args) => run_records(args, &store, terminal),
        Command::Summary(args) => run_summary(args, &store, terminal),
        Command::Top(args) => run_top(args, &store, config, terminal),
    }
}

fn run_init(store: &SqliteStore, terminal: &Terminal) -> Result<()> {
    let status = store
        .with_session(|session| {
            let count = |d: Dimension| session.dimension_names(d).map(|names| names.len());
            Ok(StoreStatus {
                database: store.path().display().to_string(),
                records: session.count_records()?,
                technicians: count(Dimension::Technician)?,
                clients: count(Dimension::Client)?,
                task_types: count(Dimension::TaskType)?,
            })
        })
        .context("failed to read store status")?;

    if terminal.is_json() {
        return terminal.print_json(&status);
    }
    terminal.print_info(&format!("Database ready at {}", status.database))?;
    terminal.print_table(
        &["Table", "Rows"],
        &[
            vec!["records".into(), status.records.to_string()],
            vec![Dimension::Technician.table().into(), status.technicians.to_string()],
            vec![Dimension::Client.table().into(), status.clients.to_string()],
            vec![Dimension::TaskType.table().into(), status.task_types.to_string()],
        ],
    )
}

fn run_import(
    args: ImportArgs,
    store: SqliteStore,
    config: &Config,
    terminal: &Terminal,
) -> Result<()> {
    let pipeline = IngestPipeline::new(store, config.ingest.clone());

    if args.dry_run {
        let batch = pipeline
            .preview_file(&args.file, args.format)
            .with_context(|| format!("failed to read {}", args.file.display()))?;
        info!(rows = batch.records.len(), "dry run, nothing written");
        return print_preview(&batch, terminal);
    }

    let report = pipeline
        .ingest_file(&args.file, args.format)
        .with_context(|| format!("failed to import {}", args.file.display()))?;
    print_report(&report, terminal)
}

fn print_preview(batch: &NormalizedBatch, terminal: &Terminal) -> Result<()> {
    if terminal.is_json() {
        return terminal.print_json(batch);
    }
    terminal.print_header("Preview")?;
    let rows: Vec<Vec<String>> = batch.records.iter().map(time_record_row).collect();
    terminal.print_table(
        &["Date", "Technician", "Client", "Task Type", "Hours", "Month"],
        &rows,
    )?;
    terminal.print_info(&format!(
        "{} of {} rows would be imported ({} dropped)",
        batch.records.len(),
        batch.total_rows,
        batch.dropped_rows
    ))
}

fn print_report(report: &IngestReport, terminal: &Terminal) -> Result<()> {
    if terminal.is_json() {
        return terminal.print_json(report);
    }
    terminal.print_info(&format!(
        "Imported {} of {} rows ({} dropped, {} rejected by the store)",
        report.inserted, report.total_rows, report.dropped_rows, report.failed
    ))?;
    if report.failed > 0 {
        terminal.print_warning("Some rows were rejected; run with RUST_LOG=warn for details")?;
    }
    Ok(())
}

fn run_records(args: RecordsArgs, store: &SqliteStore, terminal: &Terminal) -> Result<()> {
    let records = store
        .fetch_all_joined()
        .context("failed to read records")?;

    if args.options {
        let options = FilterOptions::from_records(&records);
        if terminal.is_json() {
            return terminal.print_json(&options);
        }
        return print_options(&options, terminal);
    }

    let filter = record_filter(&args);
    let matching = filter.apply(&records);
    if terminal.is_json() {
        return terminal.print_json(&matching);
    }
    let rows: Vec<Vec<String>> = matching.iter().map(|r| joined_record_row(r)).collect();
    terminal.print_table(
        &[
            "Id",
            "Date",
            "Technician",
            "Client",
            "Task Type",
            "Completed As",
            "Ticket",
            "Hours",
            "Description",
            "Month",
        ],
        &rows,
    )?;
    if filter.is_empty() {
        terminal.print_info(&format!("{} records", records.len()))
    } else {
        terminal.print_info(&format!("{} of {} records", matching.len(), records.len()))
    }
}

fn print_options(options: &FilterOptions, terminal: &Terminal) -> Result<()> {
    let months: Vec<String> = options.months.iter().map(|m| m.to_string()).collect();
    let sections: [(&str, &[String]); 4] = [
        ("Technicians", &options.technicians),
        ("Clients", &options.clients),
        ("Task types", &options.task_types),
        ("Months", &months),
    ];
    for (title, values) in sections {
        terminal.print_header(title)?;
        terminal.print_info(&values.join(", "))?;
    }
    Ok(())
}

fn run_summary(args: SummaryArgs, store: &SqliteStore, terminal: &Terminal) -> Result<()> {
    let records = store
        .fetch_all_joined()
        .context("failed to read records")?;

    match args.by {
        SummaryBy::Technician => {
            print_group_totals("Technician", &summary_by_technician(&records), terminal)
        }
        SummaryBy::Client => print_group_totals("Client", &summary_by_client(&records), terminal),
        SummaryBy::TaskType => {
            print_group_totals("Task Type", &summary_by_task_type(&records), terminal)
        }
        SummaryBy::Month => {
            let totals = summary_by_month(&records);
            if terminal.is_json() {
                return terminal.print_json(&totals);
            }
            terminal.print_table(&["Month", "Hours"], &month_rows(&totals))
        }
    }
}

fn print_group_totals(label: &str, totals: &[GroupTotal], terminal: &Terminal) -> Result<()> {
    if terminal.is_json() {
        return terminal.print_json(totals);
    }
    terminal.print_table(&[label, "Hours"], &group_rows(totals))
}

fn run_top(args: TopArgs, store: &SqliteStore, config: &Config, terminal: &Terminal) -> Result<()> {
    let records = store
        .fetch_all_joined()
        .context("failed to read records")?;
    let limit = args.limit.unwrap_or(config.report.top_n);
    let top = top_technicians_with_client_breakdown(&records, limit);

    if terminal.is_json() {
        return terminal.print_json(&top);
    }
    terminal.print_header(&format!("Top {} technicians", limit))?;
    terminal.print_table(&["Technician", "Hours"], &group_rows(&top.ranked))?;
    println!();
    terminal.print_header("By client")?;
    let rows: Vec<Vec<String>> = top
        .breakdown
        .iter()
        .map(|b| vec![b.technician.clone(), b.client.clone(), format_hours(b.hours)])
        .collect();
    terminal.print_table(&["Technician", "Client", "Hours"], &rows)
}

fn record_filter(args: &RecordsArgs) -> RecordFilter {
    RecordFilter {
        technician: args.technician.clone(),
        client: args.client.clone(),
        task_type: args.task_type.clone(),
        month: args.month,
    }
}

fn group_rows(totals: &[GroupTotal]) -> Vec<Vec<String>> {
    totals
        .iter()
        .map(|g| vec![g.key.clone(), format_hours(g.total_hours)])
        .collect()
}

fn month_rows(totals: &[MonthTotal]) -> Vec<Vec<String>> {
    totals
        .iter()
        .map(|m| vec![m.label.clone(), format_hours(m.total_hours)])
        .collect()
}

fn time_record_row(record: &TimeRecord) -> Vec<String> {
    vec![
        record.date.to_string(),
        record.technician.clone(),
        record.client.clone(),
        record.task_type.clone(),
        format_hours(record.hours),
        record.month.to_string(),
    ]
}

fn joined_record_row(record: &JoinedRecord) -> Vec<String> {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        record.id.to_string(),
        record.date.to_string(),
        record.technician.clone(),
        record.client.clone(),
        record.task_type.clone(),
        opt(&record.completion_mode),
        opt(&record.ticket_number),
        format_hours(record.hours),
        opt(&record.description),
        record.month.to_string(),
    ]
}
