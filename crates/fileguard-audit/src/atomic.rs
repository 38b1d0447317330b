//! Write-then-rename file replacement.

use fileguard_core::{GuardError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Replace `path` with `contents` so readers see either the old file or the
/// new one, never a partial write.
///
/// The temporary file is created exclusively under a random name next to
/// the target, so a pre-planted symlink cannot redirect the write and the
/// final rename stays on one filesystem. Permissions of an existing target
/// are carried over. On any failure the temporary file is removed and the
/// target is untouched.
///
/// The work runs on the blocking pool and finishes even if the returned
/// future is dropped.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let target = path.to_path_buf();
    let contents = contents.to_vec();
    tokio::task::spawn_blocking(move || replace(&target, &contents))
        .await
        .map_err(|e| GuardError::io(path.display().to_string(), std::io::Error::other(e)))?
}

fn replace(path: &Path, contents: &[u8]) -> Result<()> {
    let io_err = |e: std::io::Error| GuardError::io(path.display().to_string(), e);

    let mut tmp = tempfile::Builder::new()
        .prefix(".fileguard-")
        .suffix(".tmp")
        .tempfile_in(parent_dir(path))
        .map_err(io_err)?;
    tmp.write_all(contents).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;

    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(io_err)?;
    }

    persist(tmp, path).map_err(io_err)
}

fn persist(tmp: NamedTempFile, path: &Path) -> std::io::Result<()> {
    tmp.persist(path).map(drop).map_err(|e| e.error)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.php");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new contents").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new contents");
        assert_eq!(entries(dir.path()), vec!["index.php"]);
    }

    #[tokio::test]
    async fn creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.php");
        write_atomic(&path, b"<?php").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"<?php");
    }

    #[tokio::test]
    async fn missing_parent_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no/such/dir/file.php");
        assert!(matches!(
            write_atomic(&path, b"x").await,
            Err(GuardError::Io { .. })
        ));
        assert!(entries(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wp-cron.php");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, b"new").await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn planted_symlinks_are_not_followed() {
        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let victim = outside.path().join("victim");
        std::fs::write(&victim, "untouched").unwrap();

        let path = dir.path().join("index.php");
        std::fs::write(&path, "old").unwrap();
        for name in [
            format!(".index.php.fileguard-{}.tmp", std::process::id()),
            ".fileguard-.tmp".to_string(),
        ] {
            std::os::unix::fs::symlink(&victim, dir.path().join(name)).unwrap();
        }

        write_atomic(&path, b"<?php restored").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<?php restored");
        assert_eq!(std::fs::read_to_string(&victim).unwrap(), "untouched");
        assert_eq!(entries(dir.path()).len(), 3);
    }
}
