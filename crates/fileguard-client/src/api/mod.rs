//! API endpoint modules.

mod checksums;
mod content;

pub use checksums::ChecksumsApi;
pub use content::ContentApi;
