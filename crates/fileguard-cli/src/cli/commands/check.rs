//! `fileguard check` - run a full integrity check.

use anyhow::Result;
use fileguard_audit::{CheckRunner, RunState, Target};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::{expand_root, resolve_version, Context};
use crate::cli::args::CheckArgs;
use crate::cli::commands::report::print_report;
use crate::notify::OutboxNotifier;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: CheckArgs) -> Result<()> {
    let root = expand_root(&args.root)?;

    let mut options = ctx.check_options(&args.release);
    if args.no_core {
        options.check_core = false;
    }
    if args.no_unknown {
        options.check_unknown = false;
    }
    if args.no_restore {
        options.restore_modified = false;
    }
    if let Some(secs) = args.timeout {
        options.run_timeout_secs = secs;
    }
    options.validate()?;

    let version = resolve_version(&options, &root)?;
    let target = Target::new(&root, version, options.locale.clone());

    let client = Arc::new(ctx.client()?);
    let store = Arc::new(ctx.report_store()?);
    let mut runner = CheckRunner::new(options, client.clone(), client).with_store(store);
    if !args.no_notify {
        if let Some(notifier) = OutboxNotifier::from_options(&ctx.config.notification) {
            runner = runner.with_notifier(Arc::new(notifier));
        }
    }

    let progress = (ctx.output_format == OutputFormat::Pretty).then(|| spinner(&runner));
    let result = runner.run(&target).await;
    if let Some((bar, watcher)) = progress {
        watcher.abort();
        bar.finish_and_clear();
    }
    let report = result?;

    print_report(&ctx, &report)
}

fn spinner(runner: &CheckRunner) -> (ProgressBar, JoinHandle<()>) {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(describe(runner.state()));
    bar.enable_steady_tick(Duration::from_millis(100));

    let mut states = runner.subscribe();
    let watcher = {
        let bar = bar.clone();
        tokio::spawn(async move {
            while states.changed().await.is_ok() {
                let state = *states.borrow_and_update();
                bar.set_message(describe(state));
            }
        })
    };

    (bar, watcher)
}

const fn describe(state: RunState) -> &'static str {
    match state {
        RunState::Idle => "Starting...",
        RunState::FetchingManifest => "Fetching checksums...",
        RunState::Scanning => "Looking for unknown files...",
        RunState::Classifying => "Checking core files...",
        RunState::Restoring => "Restoring modified files...",
        RunState::Reporting => "Saving report...",
    }
}
