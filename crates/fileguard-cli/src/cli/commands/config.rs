//! `fileguard config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::{print_json, print_yaml, OutputFormat};

pub async fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(&ctx, &key, &value),
        ConfigCommands::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    match ctx.output_format {
        OutputFormat::Json => print_json(config)?,
        OutputFormat::Yaml => print_yaml(config)?,
        _ => {
            let unset = || "(default)".dimmed().to_string();
            let check = &config.check;
            let notification = &config.notification;

            println!("{}", "Current Configuration:".bold());
            println!("  {} {}", "file:".bold(), ctx.config_path.display());
            println!();
            println!(
                "  {} {}",
                "output_format:".bold(),
                config.output_format.unwrap_or_default()
            );
            println!(
                "  {} {}",
                "checksums_url:".bold(),
                config.checksums_url.clone().unwrap_or_else(unset)
            );
            println!(
                "  {} {}",
                "content_url:".bold(),
                config.content_url.clone().unwrap_or_else(unset)
            );
            println!(
                "  {} {}",
                "report_path:".bold(),
                config.report_path()?.display()
            );
            println!();
            println!("{}", "Check:".bold());
            println!("  {} {}", "check_core:".bold(), check.check_core);
            println!("  {} {}", "check_unknown:".bold(), check.check_unknown);
            println!("  {} {}", "restore_modified:".bold(), check.restore_modified);
            println!(
                "  {} {}",
                "version:".bold(),
                check
                    .version
                    .clone()
                    .unwrap_or_else(|| "(detect)".dimmed().to_string())
            );
            println!("  {} {}", "locale:".bold(), check.locale);
            println!("  {} {}", "algorithm:".bold(), check.algorithm);
            println!("  {} {}", "exclusions:".bold(), check.exclusions.join(", "));
            println!(
                "  {} {}",
                "excluded_subtrees:".bold(),
                check.excluded_subtrees.join(", ")
            );
            println!("  {} {}", "workers:".bold(), check.workers);
            println!(
                "  {} {}",
                "restore_concurrency:".bold(),
                check.restore_concurrency
            );
            println!(
                "  {} {}s",
                "request_timeout_secs:".bold(),
                check.request_timeout_secs
            );
            println!("  {} {}s", "run_timeout_secs:".bold(), check.run_timeout_secs);
            println!(
                "  {} {}s",
                "manifest_cache_ttl_secs:".bold(),
                check.manifest_cache_ttl_secs
            );
            println!();
            println!("{}", "Notification:".bold());
            println!(
                "  {} {}",
                "recipient:".bold(),
                notification
                    .recipient
                    .clone()
                    .unwrap_or_else(|| "(disabled)".dimmed().to_string())
            );
            println!("  {} {}", "site_name:".bold(), notification.site_name);
            println!("  {} {}", "subject:".bold(), notification.subject);
        }
    }

    Ok(())
}

fn set_config(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config: Config = ctx.config.clone();
    config.set(key, value)?;
    config.save(&ctx.config_path)?;

    println!(
        "{} {} set to {}.",
        "Success:".green().bold(),
        key,
        value.cyan()
    );
    Ok(())
}
