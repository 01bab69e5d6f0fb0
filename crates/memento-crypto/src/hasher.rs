use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use memento_types::ContentHash;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Read buffer size for streamed hashing.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Default upper bound on hashed payload size (100 MiB).
pub const DEFAULT_MAX_SIZE: u64 = 100 * 1024 * 1024;

/// Digest algorithm used for content fingerprints.
///
/// SHA-256 is the default because it is what browsers compute with Web
/// Crypto, so a verifier can reproduce a file hash with no extra tooling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(HashError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Content hasher producing 32-byte fingerprints.
///
/// Hashing is local and deterministic: the same bytes always produce the
/// same [`ContentHash`], and nothing is transmitted anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    algorithm: HashAlgorithm,
}

impl ContentHasher {
    /// SHA-256 hasher.
    pub const SHA256: Self = Self {
        algorithm: HashAlgorithm::Sha256,
    };
    /// BLAKE3 hasher.
    pub const BLAKE3: Self = Self {
        algorithm: HashAlgorithm::Blake3,
    };

    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The algorithm used by this hasher.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash an in-memory payload.
    pub fn hash(&self, data: &[u8]) -> ContentHash {
        let mut digester = Digester::new(self.algorithm);
        digester.update(data);
        digester.finalize()
    }

    /// Verify that data produces the expected hash.
    pub fn verify(&self, data: &[u8], expected: &ContentHash) -> bool {
        self.hash(data) == *expected
    }

    /// Hash a stream in fixed-size chunks.
    ///
    /// Fails with [`HashError::TooLarge`] as soon as more than `limit` bytes
    /// have been read; the stream is never silently truncated.
    pub fn hash_reader<R: Read>(&self, mut reader: R, limit: u64) -> Result<HashedContent, HashError> {
        let mut digester = Digester::new(self.algorithm);
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut size: u64 = 0;

        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::Io(e)),
            };
            size += read as u64;
            if size > limit {
                return Err(HashError::TooLarge { limit, size });
            }
            digester.update(&buffer[..read]);
        }

        Ok(HashedContent {
            hash: digester.finalize(),
            size,
        })
    }

    /// Hash a file on disk, streaming its contents.
    pub fn hash_file(&self, path: &Path, limit: u64) -> Result<HashedFile, HashError> {
        let file = File::open(path)?;
        let meta = file.metadata()?;
        if !meta.is_file() {
            return Err(HashError::NotAFile(path.to_path_buf()));
        }
        if meta.len() > limit {
            return Err(HashError::TooLarge {
                limit,
                size: meta.len(),
            });
        }

        let content = self.hash_reader(file, limit)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!(
            file = %path.display(),
            size = content.size,
            algorithm = %self.algorithm,
            hash = %content.hash,
            "file hashed"
        );

        Ok(HashedFile {
            hash: content.hash,
            filename,
            size: content.size,
        })
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::SHA256
    }
}

/// Result of hashing a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashedContent {
    pub hash: ContentHash,
    pub size: u64,
}

/// Result of hashing a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedFile {
    pub hash: ContentHash,
    pub filename: String,
    pub size: u64,
}

enum Digester {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl Digester {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize(self) -> ContentHash {
        match self {
            Self::Sha256(h) => ContentHash::from_digest(h.finalize().into()),
            Self::Blake3(h) => ContentHash::from_digest(*h.finalize().as_bytes()),
        }
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("payload too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { limit: u64, size: u64 },

    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    use proptest::prelude::*;

    #[test]
    fn sha256_known_vector() {
        let hash = ContentHasher::SHA256.hash(b"abc");
        assert_eq!(
            hash.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn blake3_matches_reference() {
        let hash = ContentHasher::BLAKE3.hash(b"abc");
        assert_eq!(hash.as_bytes(), blake3::hash(b"abc").as_bytes());
    }

    #[test]
    fn algorithms_differ() {
        assert_ne!(
            ContentHasher::SHA256.hash(b"same"),
            ContentHasher::BLAKE3.hash(b"same")
        );
    }

    #[test]
    fn verify_detects_tampering() {
        let hash = ContentHasher::default().hash(b"original");
        assert!(ContentHasher::default().verify(b"original", &hash));
        assert!(!ContentHasher::default().verify(b"tampered", &hash));
    }

    #[test]
    fn reader_over_limit_fails() {
        let data = vec![7u8; CHUNK_SIZE * 2];
        let err = ContentHasher::SHA256
            .hash_reader(Cursor::new(data), CHUNK_SIZE as u64)
            .unwrap_err();
        assert!(matches!(err, HashError::TooLarge { .. }));
    }

    #[test]
    fn reader_at_limit_succeeds() {
        let data = vec![1u8; 1000];
        let content = ContentHasher::SHA256
            .hash_reader(Cursor::new(data.clone()), 1000)
            .unwrap();
        assert_eq!(content.size, 1000);
        assert_eq!(content.hash, ContentHasher::SHA256.hash(&data));
    }

    #[test]
    fn hash_file_reports_name_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("essay.txt");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"my essay").unwrap();
        drop(file);

        let hashed = ContentHasher::SHA256
            .hash_file(&path, DEFAULT_MAX_SIZE)
            .unwrap();
        assert_eq!(hashed.filename, "essay.txt");
        assert_eq!(hashed.size, 8);
        assert_eq!(hashed.hash, ContentHasher::SHA256.hash(b"my essay"));
    }

    #[test]
    fn hash_file_rejects_oversized_file_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();
        let err = ContentHasher::SHA256.hash_file(&path, 1024).unwrap_err();
        assert!(matches!(err, HashError::TooLarge { limit: 1024, size: 2048 }));
    }

    #[test]
    fn hash_file_missing_is_io_error() {
        let err = ContentHasher::SHA256
            .hash_file(Path::new("/definitely/not/here.bin"), DEFAULT_MAX_SIZE)
            .unwrap_err();
        assert!(matches!(err, HashError::Io(_)));
    }

    #[test]
    fn hash_file_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = ContentHasher::SHA256.hash_file(dir.path(), DEFAULT_MAX_SIZE);
        assert!(result.is_err());
    }

    #[test]
    fn algorithm_parsing() {
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("blake3".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake3);
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    proptest! {
        #[test]
        fn hashing_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let hasher = ContentHasher::SHA256;
            prop_assert_eq!(hasher.hash(&data), hasher.hash(&data));
        }

        #[test]
        fn streaming_matches_one_shot(data in proptest::collection::vec(any::<u8>(), 0..(CHUNK_SIZE * 3))) {
            for hasher in [ContentHasher::SHA256, ContentHasher::BLAKE3] {
                let streamed = hasher.hash_reader(Cursor::new(&data), u64::MAX).unwrap();
                prop_assert_eq!(streamed.hash, hasher.hash(&data));
                prop_assert_eq!(streamed.size, data.len() as u64);
            }
        }

        #[test]
        fn distinct_payloads_distinct_hashes(a in proptest::collection::vec(any::<u8>(), 0..256),
                                             b in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assume!(a != b);
            prop_assert_ne!(ContentHasher::SHA256.hash(&a), ContentHasher::SHA256.hash(&b));
        }
    }
}
