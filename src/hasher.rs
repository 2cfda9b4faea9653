// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Content fingerprinting

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{Result, StampsortError};

/// Block size for streaming reads (64 KiB)
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Compute the lowercase hex SHA-256 of a file's full content.
///
/// The file is read once, sequentially, in [`BLOCK_SIZE`] blocks. Any read
/// failure aborts the hash; there is no partial result.
pub fn hash_file(path: &Path) -> Result<String> {
    let read_failure = |source: std::io::Error| StampsortError::ReadFailure {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_failure)?;
    hash_reader(file).map_err(read_failure)
}

/// Stream any reader through SHA-256 and return the hex digest
pub fn hash_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BLOCK_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_SHA256: &str =
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_hash_reader_known_digest() {
        assert_eq!(hash_reader(&b"hello"[..]).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn test_hash_reader_empty() {
        assert_eq!(
            hash_reader(&b""[..]).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_file_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"hello").unwrap();

        let first = hash_file(&path).unwrap();
        let second = hash_file(&path).unwrap();
        assert_eq!(first, HELLO_SHA256);
        assert_eq!(first, second);
    }

    #[test]
    fn test_hash_spans_multiple_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let data: Vec<u8> = (0..(BLOCK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        let mut file = File::create(&path).unwrap();
        file.write_all(&data).unwrap();
        drop(file);

        let streamed = hash_file(&path).unwrap();
        let whole = hex::encode(Sha256::digest(&data));
        assert_eq!(streamed, whole);
    }

    #[test]
    fn test_hash_missing_file_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = hash_file(&dir.path().join("gone.png")).unwrap_err();
        assert!(matches!(err, StampsortError::ReadFailure { .. }));
    }
}
