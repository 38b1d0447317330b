//! `fileguard unknown` - list files that are not part of the release.

use anyhow::Result;
use colored::Colorize;
use fileguard_audit::{list_unknown_files, FileRecord, ManifestProvider};
use fileguard_core::Manifest;
use serde::Serialize;
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};
use tracing::warn;

use super::{expand_root, resolve_version, Context};
use crate::cli::args::UnknownArgs;
use crate::output::{print_csv, print_json, print_yaml, size_format, OutputFormat};

#[derive(Tabled, Serialize)]
struct UnknownRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
}

impl From<&FileRecord> for UnknownRow {
    fn from(record: &FileRecord) -> Self {
        Self {
            path: record.relative_path.clone(),
            size: size_format(record.size),
            modified: record.modified.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

pub async fn execute(ctx: Context, args: UnknownArgs) -> Result<()> {
    let root = expand_root(&args.root)?;
    let options = ctx.check_options(&args.release);
    options.validate()?;
    let version = resolve_version(&options, &root)?;

    let manifests = ManifestProvider::new(Arc::new(ctx.client()?), options.manifest_cache_ttl());
    let manifest = match manifests.get_manifest(&version, &options.locale).await {
        Ok(manifest) => manifest,
        Err(e) => {
            // Same fallback as `check`: an outage must not hide new files.
            warn!(error = %e, "manifest unavailable, listing every non-excluded file");
            eprintln!(
                "{} {}
{}",
                "Warning:".yellow().bold(),
                e,
                "Checksums unavailable; every file that is not excluded is listed.".dimmed()
            );
            Arc::new(Manifest::empty(&version, &options.locale, options.algorithm))
        }
    };
    let files = list_unknown_files(&root, &manifest, &options.exclusion_set())?;

    match ctx.output_format {
        OutputFormat::Json => print_json(&files)?,
        OutputFormat::Yaml => print_yaml(&files)?,
        OutputFormat::Csv => {
            let rows: Vec<UnknownRow> = files.iter().map(UnknownRow::from).collect();
            print_csv(&rows)?;
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} ({} {})",
                "Release:".bold(),
                version.cyan(),
                options.locale,
                format!("{} files in manifest", manifest.len()).dimmed()
            );
            println!();

            if files.is_empty() {
                println!("{}", "No unknown files found.".green().bold());
                return Ok(());
            }

            let rows: Vec<UnknownRow> = files.iter().map(UnknownRow::from).collect();
            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("{table}");

            let total: u64 = files.iter().map(|f| f.size).sum();
            println!();
            println!(
                "{} {} unknown files, {}",
                "Total:".bold(),
                files.len().to_string().yellow(),
                size_format(total)
            );
            println!();
            println!(
                "{}",
                format!(
                    "Tip: Remove files with `fileguard delete {} <PATH>...`",
                    args.root
                )
                .dimmed()
            );
        }
    }

    Ok(())
}
