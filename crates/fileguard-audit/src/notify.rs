//! Notification seam.

use async_trait::async_trait;
use fileguard_core::{Report, Result};

/// Receives reports that contain findings.
///
/// Delivery (mail, chat, files) is up to the implementation; the runner
/// only calls it after a run found something.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification about `report`
    async fn notify(&self, report: &Report) -> Result<()>;
}
