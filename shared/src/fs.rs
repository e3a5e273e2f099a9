//! Host filesystem helpers shared by the storage backends and tools.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Default cap on a single file read into memory.
pub const MAX_FILE_BYTES: u64 = 512 * 1024 * 1024; // 512 MiB

/// Read a whole file into `out`, refusing files larger than `max_bytes`.
///
/// `out` is cleared first. The cap is enforced on the bytes actually read,
/// so a file that grows after the size check still cannot exceed it.
pub fn read_file_with_limit(path: &Path, max_bytes: u64, out: &mut Vec<u8>) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?
        .len();
    if len > max_bytes {
        anyhow::bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            len,
            max_bytes
        );
    }

    out.clear();
    out.reserve(len as usize);
    file.take(max_bytes.saturating_add(1))
        .read_to_end(out)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    if out.len() as u64 > max_bytes {
        anyhow::bail!(
            "File grew past the size limit while reading: {} (max {} bytes)",
            path.display(),
            max_bytes
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_small_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let mut out = vec![9, 9, 9, 9];
        read_file_with_limit(&path, 16, &mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn test_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, vec![0u8; 32]).unwrap();

        let mut out = Vec::new();
        let err = read_file_with_limit(&path, 31, &mut out).unwrap_err();
        assert!(err.to_string().contains("File too large"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        assert!(read_file_with_limit(&dir.path().join("missing"), 16, &mut out).is_err());
    }
}
