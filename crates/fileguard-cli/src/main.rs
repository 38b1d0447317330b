//! fileguard - file integrity checker
//!
//! Verifies an installation against its reference checksums, restores
//! tampered files and lists files that do not belong.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    fileguard_cli::run().await
}
