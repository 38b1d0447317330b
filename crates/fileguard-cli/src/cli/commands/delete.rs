//! `fileguard delete` - remove files below a root.

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use fileguard_audit::delete_files;
use serde::Serialize;
use std::io::IsTerminal;

use super::{expand_root, Context};
use crate::cli::args::DeleteArgs;
use crate::output::{print_csv, print_json, print_yaml, OutputFormat};

#[derive(Serialize)]
struct DeleteRow<'a> {
    path: &'a str,
    status: &'static str,
    reason: &'a str,
}

pub async fn execute(ctx: Context, args: DeleteArgs) -> Result<()> {
    let root = expand_root(&args.root)?;

    if !args.yes {
        if !std::io::stdin().is_terminal() {
            anyhow::bail!("Refusing to delete without confirmation; pass --yes to proceed");
        }
        println!("{}", "Files to delete:".bold());
        for path in &args.paths {
            println!("  {}", path.red());
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {} file(s) under {}?", args.paths.len(), root.display()))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted.".dimmed());
            return Ok(());
        }
    }

    let report = delete_files(&root, args.paths.as_slice())?;

    match ctx.output_format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Yaml => print_yaml(&report)?,
        OutputFormat::Csv => {
            let rows: Vec<DeleteRow<'_>> = report
                .deleted
                .iter()
                .map(|path| DeleteRow {
                    path,
                    status: "deleted",
                    reason: "",
                })
                .chain(report.failed.iter().map(|f| DeleteRow {
                    path: &f.path,
                    status: "failed",
                    reason: &f.reason,
                }))
                .collect();
            print_csv(&rows)?;
        }
        OutputFormat::Pretty => {
            for path in &report.deleted {
                println!("{} {}", "Deleted:".green().bold(), path);
            }
            for failure in &report.failed {
                println!(
                    "{} {} ({})",
                    "Failed:".red().bold(),
                    failure.path,
                    failure.reason.dimmed()
                );
            }
        }
    }

    if !report.failed.is_empty() {
        anyhow::bail!(
            "{} of {} file(s) could not be deleted",
            report.failed.len(),
            args.paths.len()
        );
    }

    Ok(())
}
