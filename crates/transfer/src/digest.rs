use std::fmt;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{DIGEST_CHUNK_SIZE, TransferError};

/// Lowercase hex SHA-256 of an artifact's bytes.
///
/// Only constructible by hashing or by validating an existing hex string,
/// so every value is exactly 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Length of the hex encoding.
    pub const HEX_LEN: usize = 64;

    /// Parses a hex digest. Uppercase input is normalized to lowercase.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransferError> {
        if hex_str.len() != Self::HEX_LEN {
            return Err(TransferError::InvalidDigest(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                hex_str.len()
            )));
        }
        if !hex_str.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TransferError::InvalidDigest(format!(
                "non-hex character in {hex_str:?}"
            )));
        }
        Ok(Self(hex_str.to_ascii_lowercase()))
    }

    /// Returns the hex encoding.
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    fn from_hasher(hasher: Sha256) -> Self {
        Self(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = TransferError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ContentDigest> for String {
    fn from(value: ContentDigest) -> Self {
        value.0
    }
}

/// Computes the digest of an in-memory buffer.
pub fn digest_bytes(data: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    ContentDigest::from_hasher(hasher)
}

/// Digests everything `reader` yields, reading at most `chunk_size` bytes
/// at a time. Returns the digest and the number of bytes consumed.
///
/// A `chunk_size` of 0 selects [`DIGEST_CHUNK_SIZE`].
pub fn digest_reader<R: Read>(
    mut reader: R,
    chunk_size: usize,
) -> std::io::Result<(ContentDigest, u64)> {
    let chunk_size = if chunk_size == 0 {
        DIGEST_CHUNK_SIZE
    } else {
        chunk_size
    };

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; chunk_size];
    let mut total: u64 = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        total += n as u64;
    }

    Ok((ContentDigest::from_hasher(hasher), total))
}

/// Digests a file on disk in [`DIGEST_CHUNK_SIZE`] chunks.
///
/// Returns the digest together with the number of bytes hashed. No partial
/// result is returned if the file cannot be opened or a read fails.
pub fn digest_file(path: &Path) -> Result<(ContentDigest, u64), TransferError> {
    let file = std::fs::File::open(path).map_err(|e| TransferError::file_access(path, e))?;
    digest_reader(file, DIGEST_CHUNK_SIZE).map_err(|e| TransferError::file_access(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn create_test_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(data).unwrap();
        path
    }

    /// Reader that records the largest buffer it was asked to fill.
    struct InstrumentedReader<R> {
        inner: R,
        max_request: usize,
        reads: usize,
    }

    impl<R: Read> Read for InstrumentedReader<R> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.max_request = self.max_request.max(buf.len());
            self.reads += 1;
            self.inner.read(buf)
        }
    }

    /// Reader that fails after yielding some bytes.
    struct FailingReader {
        remaining: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.remaining == 0 {
                return Err(std::io::Error::other("disk went away"));
            }
            let n = buf.len().min(self.remaining);
            buf[..n].fill(0xAA);
            self.remaining -= n;
            Ok(n)
        }
    }

    #[test]
    fn known_vectors() {
        assert_eq!(digest_bytes(b"").as_hex(), EMPTY_SHA256);
        assert_eq!(digest_bytes(b"abc").as_hex(), ABC_SHA256);
    }

    #[test]
    fn digest_is_lowercase_fixed_length() {
        let d = digest_bytes(b"hello world");
        assert_eq!(d.as_hex().len(), ContentDigest::HEX_LEN);
        assert!(d.as_hex().chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn file_digest_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "app.ipa", b"0123456789");

        let (d1, size1) = digest_file(&path).unwrap();
        let (d2, size2) = digest_file(&path).unwrap();
        assert_eq!(d1, d2);
        assert_eq!(size1, 10);
        assert_eq!(size2, 10);
        assert_eq!(d1, digest_bytes(b"0123456789"));
    }

    #[test]
    fn digest_independent_of_chunk_size() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let expected = digest_bytes(&data);

        for chunk_size in [1, 7, 4096, DIGEST_CHUNK_SIZE, 1 << 20] {
            let (d, n) = digest_reader(data.as_slice(), chunk_size).unwrap();
            assert_eq!(d, expected, "chunk size {chunk_size}");
            assert_eq!(n, data.len() as u64);
        }
    }

    #[test]
    fn single_byte_difference_changes_digest() {
        let dir = TempDir::new().unwrap();
        let a = create_test_file(dir.path(), "a.bin", b"artifact-bytes-0");
        let b = create_test_file(dir.path(), "b.bin", b"artifact-bytes-1");
        assert_ne!(digest_file(&a).unwrap().0, digest_file(&b).unwrap().0);
    }

    #[test]
    fn streaming_never_requests_more_than_one_chunk() {
        let total = 5 * 1024 * 1024 + 123;
        let mut reader = InstrumentedReader {
            inner: std::io::repeat(0x5A).take(total as u64),
            max_request: 0,
            reads: 0,
        };

        let (_, n) = digest_reader(&mut reader, DIGEST_CHUNK_SIZE).unwrap();
        assert_eq!(n, total as u64);
        assert!(reader.max_request <= DIGEST_CHUNK_SIZE);
        assert!(reader.reads > total / DIGEST_CHUNK_SIZE);
    }

    #[test]
    fn read_failure_yields_no_digest() {
        let result = digest_reader(FailingReader { remaining: 100_000 }, 4096);
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let result = digest_file(Path::new("/nonexistent/app.ipa"));
        assert!(matches!(result, Err(TransferError::FileAccess { .. })));
    }

    #[test]
    fn from_hex_validates() {
        assert!(ContentDigest::from_hex(ABC_SHA256).is_ok());
        assert_eq!(
            ContentDigest::from_hex(&ABC_SHA256.to_uppercase())
                .unwrap()
                .as_hex(),
            ABC_SHA256
        );
        assert!(ContentDigest::from_hex("abc").is_err());
        assert!(ContentDigest::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn serde_is_transparent_hex() {
        let d = digest_bytes(b"abc");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{ABC_SHA256}\""));
        let parsed: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
        assert!(serde_json::from_str::<ContentDigest>("\"nope\"").is_err());
    }
}
