//! Streaming content hashing (MD5 via `md-5`, SHA-256 via `ring::digest`).

use fileguard_core::{ChecksumAlgorithm, GuardError, Result};
use md5::{Digest, Md5};
use ring::digest::{Context, SHA256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Buffer size for streaming file reads (64 KiB).
const BUF_SIZE: usize = 64 * 1024;

enum Hasher {
    Md5(Md5),
    Sha256(Context),
}

impl Hasher {
    fn new(algorithm: ChecksumAlgorithm) -> Self {
        match algorithm {
            ChecksumAlgorithm::Md5 => Self::Md5(Md5::new()),
            ChecksumAlgorithm::Sha256 => Self::Sha256(Context::new(&SHA256)),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
        }
    }

    fn finish(self) -> String {
        match self {
            Self::Md5(h) => hex::encode(h.finalize()),
            Self::Sha256(h) => hex::encode(h.finish().as_ref()),
        }
    }
}

/// Compute the checksum of a file, streaming to avoid loading it all into memory.
///
/// Returns a lowercase hex-encoded digest.
///
/// # Errors
///
/// Returns `GuardError::Io` if the file cannot be opened or read.
pub async fn checksum_file(path: &Path, algorithm: ChecksumAlgorithm) -> Result<String> {
    let path_str = path.display().to_string();
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| GuardError::io(&path_str, e))?;

    let mut hasher = Hasher::new(algorithm);
    let mut buf = vec![0u8; BUF_SIZE];

    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| GuardError::io(&path_str, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finish())
}

/// Compute the checksum of raw bytes.
#[must_use]
pub fn checksum_bytes(data: &[u8], algorithm: ChecksumAlgorithm) -> String {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_md5_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "hello world").unwrap();
        tmp.flush().unwrap();

        let hash = checksum_file(tmp.path(), ChecksumAlgorithm::Md5).await.unwrap();
        assert_eq!(hash, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[tokio::test]
    async fn test_sha256_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "hello world").unwrap();
        tmp.flush().unwrap();

        let hash = checksum_file(tmp.path(), ChecksumAlgorithm::Sha256)
            .await
            .unwrap();
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_checksum_bytes() {
        assert_eq!(
            checksum_bytes(b"hello world", ChecksumAlgorithm::Md5),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
        assert_eq!(
            checksum_bytes(b"hello world", ChecksumAlgorithm::Sha256),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn test_empty_file() {
        let tmp = NamedTempFile::new().unwrap();
        let hash = checksum_file(tmp.path(), ChecksumAlgorithm::Md5).await.unwrap();
        assert_eq!(hash, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[tokio::test]
    async fn test_larger_than_buffer_matches_bytes() {
        let data = vec![0x5au8; BUF_SIZE * 2 + 17];
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(&data).unwrap();
        tmp.flush().unwrap();

        let streamed = checksum_file(tmp.path(), ChecksumAlgorithm::Md5).await.unwrap();
        assert_eq!(streamed, checksum_bytes(&data, ChecksumAlgorithm::Md5));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = checksum_file(Path::new("/nonexistent/fileguard"), ChecksumAlgorithm::Md5)
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Io { .. }));
    }
}
