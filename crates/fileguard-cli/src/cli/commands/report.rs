//! `fileguard report` - show the most recent report.

use anyhow::Result;
use colored::Colorize;
use fileguard_audit::ReportStore;
use fileguard_core::Report;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::ReportArgs;
use crate::notify::render_message;
use crate::output::{print_csv, print_json, print_yaml, OutputFormat};

#[derive(Tabled, Serialize)]
struct FindingRow {
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

pub async fn execute(ctx: Context, args: ReportArgs) -> Result<()> {
    let store = ctx.report_store()?;
    let Some(report) = store.load().await? else {
        println!(
            "No report found at {}.\nRun {} first.",
            store.path().display(),
            "fileguard check <ROOT>".cyan()
        );
        return Ok(());
    };

    if args.render {
        let (subject, body) = render_message(&ctx.config.notification, &report);
        println!("Subject: {subject}\n\n{body}");
        return Ok(());
    }

    print_report(&ctx, &report)
}

/// Print a report in the context's output format.
pub fn print_report(ctx: &Context, report: &Report) -> Result<()> {
    match ctx.output_format {
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Yaml => print_yaml(report)?,
        OutputFormat::Csv => print_csv(&finding_rows(report))?,
        OutputFormat::Pretty => print_report_pretty(report),
    }
    Ok(())
}

fn finding_rows(report: &Report) -> Vec<FindingRow> {
    let mut rows = Vec::new();
    for path in &report.modified_files {
        let detail = if report.restored_files.contains(path) {
            "restored".to_string()
        } else {
            report
                .restoration_failures
                .iter()
                .find(|f| &f.path == path)
                .map_or_else(|| "not restored".to_string(), |f| f.reason.clone())
        };
        rows.push(FindingRow {
            status: "modified",
            path: path.clone(),
            detail,
        });
    }
    for path in &report.unknown_files {
        rows.push(FindingRow {
            status: "unknown",
            path: path.clone(),
            detail: String::new(),
        });
    }
    for failure in &report.scan_errors {
        rows.push(FindingRow {
            status: "unreadable",
            path: failure.path.clone(),
            detail: failure.reason.clone(),
        });
    }
    rows
}

fn print_report_pretty(report: &Report) {
    // Header
    println!("{} {}", "Root:".bold(), report.root);
    println!(
        "{} {} ({})",
        "Release:".bold(),
        report.version.cyan(),
        report.locale
    );
    println!(
        "{} {}",
        "Checked:".bold(),
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if let Some(error) = &report.manifest_error {
        println!("{} {}", "Checksums unavailable:".yellow().bold(), error);
        println!("{}", "Core files were not compared.".dimmed());
        println!();
    }
    if report.timed_out {
        println!(
            "{}",
            "Run deadline expired; results below are partial.".yellow().bold()
        );
        println!();
    }

    let rows = finding_rows(report);
    if rows.is_empty() {
        println!("{}", "No modified or unknown files found.".green().bold());
    } else {
        let table = Table::new(&rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    // Summary
    println!();
    println!(
        "{} {} modified, {} restored, {} failed, {} unknown ({} ms)",
        "Summary:".bold(),
        report.modified_files.len().to_string().yellow(),
        report.restored_files.len().to_string().green(),
        report.restoration_failures.len().to_string().red(),
        report.unknown_files.len().to_string().cyan(),
        report.duration_ms
    );

    if !report.unknown_files.is_empty() {
        println!();
        println!(
            "{}",
            "Tip: Review unknown files with `fileguard unknown <ROOT>` and remove them with `fileguard delete`"
                .dimmed()
        );
    }
}
