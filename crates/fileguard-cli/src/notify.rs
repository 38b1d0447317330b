//! Notification delivery for the CLI.
//!
//! Messages are rendered from the configured templates and written out as
//! mail-style text blocks. Handing them to a mail transport is left to
//! whatever picks up the outbox file.

use async_trait::async_trait;
use fileguard_audit::Notifier;
use fileguard_core::{render, GuardError, NotificationOptions, Report};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Where rendered notifications go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbox {
    /// Standard error
    Stderr,
    /// Appended to a file
    File(PathBuf),
}

impl Outbox {
    /// Interpret a configured recipient: `-` means stderr, anything else is a file.
    pub fn parse(recipient: &str) -> Self {
        match recipient.trim() {
            "-" | "stderr" => Self::Stderr,
            path => Self::File(PathBuf::from(shellexpand::tilde(path).into_owned())),
        }
    }
}

/// Render the subject and body for `report`.
pub fn render_message(options: &NotificationOptions, report: &Report) -> (String, String) {
    (
        render(&options.subject, report, &options.site_name),
        render(&options.template, report, &options.site_name),
    )
}

/// Writes rendered notifications to an [`Outbox`].
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    options: NotificationOptions,
    outbox: Outbox,
}

impl OutboxNotifier {
    /// Build a notifier from settings; `None` when no recipient is configured.
    pub fn from_options(options: &NotificationOptions) -> Option<Self> {
        let recipient = options.recipient.as_deref()?;
        Some(Self {
            options: options.clone(),
            outbox: Outbox::parse(recipient),
        })
    }

    /// Full message text for `report`.
    pub fn message(&self, report: &Report) -> String {
        let (subject, body) = render_message(&self.options, report);
        format!(
            "Date: {}\nSubject: {}\n\n{}\n\n",
            report.timestamp.to_rfc2822(),
            subject,
            body
        )
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn notify(&self, report: &Report) -> fileguard_core::Result<()> {
        let message = self.message(report);
        match &self.outbox {
            Outbox::Stderr => {
                eprint!("{message}");
                Ok(())
            }
            Outbox::File(path) => {
                let path_str = path.display().to_string();
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await
                    .map_err(|e| GuardError::io(&path_str, e))?;
                file.write_all(message.as_bytes())
                    .await
                    .map_err(|e| GuardError::io(&path_str, e))?;
                tracing::info!(path = %path_str, "notification written");
                Ok(())
            }
        }
    }
}
