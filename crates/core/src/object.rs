//! Loose object storage with zlib compression and content addressing
//!
//! Every object is encoded as `<kind>\0<payload>` and addressed by the SHA-1
//! of that encoding. On disk the encoding is zlib-compressed and stored at
//! `objects/<hh>/<rest>`.

use crate::error::{Error, Result};
use crate::hash::{is_hex_prefix, IncrementalHasher, Oid, OID_HEX_LEN};
use crate::store::atomic_write;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Type tag of a stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            "commit" => Ok(ObjectKind::Commit),
            other => Err(format!("unknown object kind '{}'", other)),
        }
    }
}

/// Compute the id `data` would be stored under, without storing it
pub fn hash_object_bytes(data: &[u8], kind: ObjectKind) -> Oid {
    let mut hasher = IncrementalHasher::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update(&[0]);
    hasher.update(data);
    hasher.finalize()
}

fn encode(data: &[u8], kind: ObjectKind) -> Vec<u8> {
    let tag = kind.as_str().as_bytes();
    let mut encoded = Vec::with_capacity(tag.len() + 1 + data.len());
    encoded.extend_from_slice(tag);
    encoded.push(0);
    encoded.extend_from_slice(data);
    encoded
}

fn decode(oid: Oid, encoded: &[u8]) -> Result<(ObjectKind, &[u8])> {
    let sep = encoded
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::malformed_object(oid, "missing type separator"))?;
    let tag = std::str::from_utf8(&encoded[..sep])
        .map_err(|_| Error::malformed_object(oid, "type tag is not utf-8"))?;
    let kind = tag
        .parse::<ObjectKind>()
        .map_err(|reason| Error::malformed_object(oid, reason))?;
    Ok((kind, &encoded[sep + 1..]))
}

/// Content-addressed object storage rooted at `objects/`
pub struct ObjectStore {
    /// objects/ directory
    root: PathBuf,
    /// Scratch directory for atomic writes
    tmp_dir: PathBuf,
}

impl ObjectStore {
    pub fn new(root: PathBuf, tmp_dir: PathBuf) -> Self {
        Self { root, tmp_dir }
    }

    /// Store `data` tagged with `kind` and return its id
    ///
    /// Idempotent: an object that is already present is not rewritten.
    pub fn hash_object(&self, data: &[u8], kind: ObjectKind) -> Result<Oid> {
        let encoded = encode(data, kind);
        let mut hasher = IncrementalHasher::new();
        hasher.update(&encoded);
        let oid = hasher.finalize();

        let path = self.object_path(oid);
        if path.exists() {
            return Ok(oid);
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&encoded)?;
        let compressed = encoder.finish()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        atomic_write(&self.tmp_dir, &path, &compressed)?;
        debug!(%oid, %kind, size = data.len(), "stored object");
        Ok(oid)
    }

    /// Read an object's payload, optionally checking its kind
    pub fn get_object(&self, oid: Oid, expected: Option<ObjectKind>) -> Result<Vec<u8>> {
        let (kind, payload) = self.read_object(oid)?;
        if let Some(expected) = expected {
            if kind != expected {
                return Err(Error::UnexpectedObjectKind {
                    oid,
                    expected,
                    actual: kind,
                });
            }
        }
        Ok(payload)
    }

    /// Read an object's kind and payload
    pub fn read_object(&self, oid: Oid) -> Result<(ObjectKind, Vec<u8>)> {
        let encoded = self.read_encoded(oid)?;
        let (kind, payload) = decode(oid, &encoded)?;
        Ok((kind, payload.to_vec()))
    }

    /// Kind of a stored object
    pub fn object_kind(&self, oid: Oid) -> Result<ObjectKind> {
        let encoded = self.read_encoded(oid)?;
        Ok(decode(oid, &encoded)?.0)
    }

    pub fn contains(&self, oid: Oid) -> bool {
        self.object_path(oid).is_file()
    }

    /// Remove a loose object, returning the bytes it occupied on disk
    pub fn remove(&self, oid: Oid) -> Result<u64> {
        let path = self.object_path(oid);
        let size = std::fs::metadata(&path)?.len();
        std::fs::remove_file(&path)?;
        if let Some(parent) = path.parent() {
            // Fan-out directory is left behind only if other objects share it
            let _ = std::fs::remove_dir(parent);
        }
        Ok(size)
    }

    /// Enumerate every stored object id
    pub fn iter_oids(&self) -> Result<Vec<Oid>> {
        let mut oids = Vec::new();
        let fanout = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(oids),
            Err(e) => return Err(e.into()),
        };

        for dir in fanout {
            let dir = dir?;
            let prefix = dir.file_name().to_string_lossy().into_owned();
            if prefix.len() != 2 || !dir.file_type()?.is_dir() {
                continue;
            }
            for file in std::fs::read_dir(dir.path())? {
                let file = file?;
                let rest = file.file_name().to_string_lossy().into_owned();
                if let Ok(oid) = Oid::from_hex(&format!("{}{}", prefix, rest)) {
                    oids.push(oid);
                }
            }
        }

        oids.sort();
        Ok(oids)
    }

    /// Every stored id starting with the hex `prefix`
    pub fn resolve_prefix(&self, prefix: &str) -> Result<Vec<Oid>> {
        if !is_hex_prefix(prefix) {
            return Ok(Vec::new());
        }
        let prefix = prefix.to_ascii_lowercase();
        if prefix.len() == OID_HEX_LEN {
            let oid = Oid::from_hex(&prefix).map_err(|_| Error::InvalidOid(prefix.clone()))?;
            return Ok(if self.contains(oid) { vec![oid] } else { Vec::new() });
        }

        // Only the matching fan-out directory needs scanning
        let dir = self.root.join(&prefix[..2]);
        let mut matches = Vec::new();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(matches),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            let full = format!("{}{}", &prefix[..2], name);
            if full.starts_with(&prefix) {
                if let Ok(oid) = Oid::from_hex(&full) {
                    matches.push(oid);
                }
            }
        }
        matches.sort();
        Ok(matches)
    }

    /// Root of the objects directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_encoded(&self, oid: Oid) -> Result<Vec<u8>> {
        let compressed = match std::fs::read(self.object_path(oid)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::ObjectNotFound(oid)),
            Err(e) => return Err(e.into()),
        };
        let mut encoded = Vec::new();
        ZlibDecoder::new(&compressed[..])
            .read_to_end(&mut encoded)
            .map_err(|e| Error::malformed_object(oid, format!("zlib: {}", e)))?;
        Ok(encoded)
    }

    /// objects/<hh>/<rest>
    fn object_path(&self, oid: Oid) -> PathBuf {
        let hex = oid.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }
}
