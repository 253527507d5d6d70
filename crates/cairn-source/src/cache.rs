//! Content-addressed response cache.
//!
//! Entries are JSON files named by the SHA-256 of their key. Freshness comes
//! from the file's mtime; an entry past the TTL reports [`CacheError::Expired`],
//! which callers must treat differently from a plain miss (`Ok(None)`).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache entry expired")]
    Expired,

    #[error("cannot locate a home directory for the cache")]
    NoHomeDir,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("decode cached value: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
    ttl: Duration,
}

impl Cache {
    /// Opens (creating if needed) a cache under `dir`, defaulting to
    /// `~/.cache/cairn`. A zero TTL disables expiry.
    pub fn new(dir: Option<PathBuf>, ttl: Duration) -> Result<Self, CacheError> {
        let dir = match dir {
            Some(dir) => dir,
            None => default_dir()?,
        };
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, ttl })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let path = self.path(key);
        let meta = match fs::metadata(&path) {
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
            Ok(meta) => meta,
        };

        if !self.ttl.is_zero() {
            let age = meta
                .modified()?
                .elapsed()
                .unwrap_or(Duration::ZERO);
            if age > self.ttl {
                return Err(CacheError::Expired);
            }
        }

        let data = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&data)?))
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let data = serde_json::to_vec(value)?;
        fs::write(self.path(key), data)?;
        Ok(())
    }

    fn path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        let mut name = String::with_capacity(64);
        for byte in digest {
            name.push_str(&format!("{byte:02x}"));
        }
        self.dir.join(name)
    }
}

fn default_dir() -> Result<PathBuf, CacheError> {
    let home = std::env::var_os("HOME").ok_or(CacheError::NoHomeDir)?;
    Ok(PathBuf::from(home).join(".cache").join("cairn"))
}
