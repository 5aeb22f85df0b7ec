//! Terminal output helpers

use colored::*;
use dockformer_engine::ReconcileReport;
use dockformer_types::InventoryRecord;
use tabled::{Table, Tabled};

use crate::{OutputFormat, Result};

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message.yellow());
}

pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "IMAGE")]
    image: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "PORTS")]
    ports: String,
    #[tabled(rename = "UPDATED")]
    updated: String,
}

impl From<&InventoryRecord> for RecordRow {
    fn from(record: &InventoryRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            image: record.image.clone(),
            status: colored_status(record),
            ports: record.ports.clone(),
            updated: record.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

fn colored_status(record: &InventoryRecord) -> String {
    let status = record.status.as_str();
    if record.status.is_running() {
        status.green().to_string()
    } else if record.status.is_recognized() {
        status.yellow().to_string()
    } else {
        status.red().to_string()
    }
}

pub fn print_records(records: &[InventoryRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Table => {
            if records.is_empty() {
                info("No containers tracked.");
            } else {
                println!("{}", Table::new(records.iter().map(RecordRow::from)));
            }
        }
        OutputFormat::Plain => {
            for record in records {
                println!("{}", record);
            }
        }
    }
    Ok(())
}

pub fn print_record(record: &InventoryRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Table => {
            println!("{:<12} {}", "Name:".bold(), record.name);
            println!("{:<12} {}", "ID:".bold(), record.id);
            println!("{:<12} {}", "Image:".bold(), record.image);
            println!("{:<12} {}", "Status:".bold(), colored_status(record));
            println!("{:<12} {}", "Ports:".bold(), record.ports);
            println!("{:<12} {}", "Runtime ID:".bold(), record.runtime_id);
            println!("{:<12} {}", "Created:".bold(), record.created_at.to_rfc3339());
            println!("{:<12} {}", "Updated:".bold(), record.updated_at.to_rfc3339());
        }
        OutputFormat::Plain => println!("{}", record),
    }
    Ok(())
}

pub fn print_report(report: &ReconcileReport, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let summary = format!(
        "Reconciled in {:.2?}: {} updated, {} created, {} skipped",
        report.duration,
        report.updated.len(),
        report.created.len(),
        report.skipped.len()
    );
    if report.is_clean() {
        success(&summary);
    } else {
        warning(&summary);
    }

    for (name, error) in &report.failed {
        println!("  {} {}: {}", "✗".red(), name, error);
    }
    if !report.unobserved.is_empty() {
        warning(&format!(
            "Not found in the runtime: {}",
            report.unobserved.join(", ")
        ));
    }
    Ok(())
}
