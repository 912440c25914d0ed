//! Directory-backed store: one file per key.
//!
//! File names are the lowercase hex encoding of the key bytes, so any key is
//! a valid file name and `user:42:score` cannot escape the root directory.
//! Keys whose hex form would exceed common file-name limits are stored under
//! the hex BLAKE3 hash of the key instead, with the key itself written at
//! the head of the file.
//!
//! Writes land in a temporary file in the same directory and are renamed
//! into place, so a reader never observes a half-written value.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{validate_key, RemoteStore};

/// Suffix of value files named by the hex-encoded key.
const VALUE_EXT: &str = "val";

/// Suffix of value files named by the key hash.
const HASHED_EXT: &str = "hval";

/// Longest hex stem used directly as a file name.
const MAX_STEM_LEN: usize = 200;

/// A [`RemoteStore`] persisted as files under a root directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

/// Where a key lives on disk.
enum Location {
    /// `<hex key>.val`, holding the raw value.
    Plain(PathBuf),
    /// `<hex hash>.hval`, holding `u32 BE key length | key | value`.
    Hashed(PathBuf),
}

impl DirStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "dir store opened");
        Ok(Self { root })
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All keys currently stored, sorted.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if ext == Some(VALUE_EXT) {
                if let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_key) {
                    keys.push(key);
                }
            } else if ext == Some(HASHED_EXT) {
                let data = fs::read(&path)?;
                let (key, _) = split_hashed(&data, &path)?;
                if let Ok(key) = String::from_utf8(key.to_vec()) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn locate(&self, key: &str) -> StoreResult<Location> {
        validate_key(key)?;
        let stem = hex::encode(key.as_bytes());
        if stem.len() <= MAX_STEM_LEN {
            return Ok(Location::Plain(
                self.root.join(format!("{stem}.{VALUE_EXT}")),
            ));
        }
        let hash = blake3::hash(key.as_bytes());
        Ok(Location::Hashed(self.root.join(format!(
            "{}.{HASHED_EXT}",
            hex::encode(hash.as_bytes())
        ))))
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> StoreResult<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

fn decode_key(stem: &str) -> Option<String> {
    let bytes = hex::decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}

fn read_optional(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Split a hashed entry into its key and value.
fn split_hashed<'d>(data: &'d [u8], path: &Path) -> StoreResult<(&'d [u8], &'d [u8])> {
    let corrupt = || StoreError::Corrupt(path.display().to_string());
    let header: [u8; 4] = data
        .get(..4)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(corrupt)?;
    let len = u32::from_be_bytes(header) as usize;
    let key = data.get(4..4 + len).ok_or_else(corrupt)?;
    Ok((key, &data[4 + len..]))
}

fn join_hashed(key: &str, value: &[u8]) -> StoreResult<Vec<u8>> {
    let len = u32::try_from(key.len()).map_err(|_| StoreError::InvalidKey(key.to_string()))?;
    let mut bytes = Vec::with_capacity(4 + key.len() + value.len());
    bytes.extend_from_slice(&len.to_be_bytes());
    bytes.extend_from_slice(key.as_bytes());
    bytes.extend_from_slice(value);
    Ok(bytes)
}

impl RemoteStore for DirStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        match self.locate(key)? {
            Location::Plain(path) => read_optional(&path),
            Location::Hashed(path) => {
                let Some(data) = read_optional(&path)? else {
                    return Ok(None);
                };
                let (stored_key, value) = split_hashed(&data, &path)?;
                if stored_key == key.as_bytes() {
                    Ok(Some(value.to_vec()))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<bool> {
        match self.locate(key)? {
            Location::Plain(path) => self.write_atomic(&path, value)?,
            Location::Hashed(path) => self.write_atomic(&path, &join_hashed(key, value)?)?,
        }
        debug!(key, len = value.len(), "dir store write");
        Ok(true)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let path = match self.locate(key)? {
            Location::Plain(path) => path,
            Location::Hashed(path) => {
                if self.get(key)?.is_none() {
                    return Ok(false);
                }
                path
            }
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        match self.locate(key)? {
            Location::Plain(path) => Ok(path.is_file()),
            Location::Hashed(_) => Ok(self.get(key)?.is_some()),
        }
    }
}
