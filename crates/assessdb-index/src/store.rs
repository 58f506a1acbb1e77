//! Paired persistence of the vector index and its metadata sequence.
//!
//! Layout of `assessments.index` (little-endian):
//! `ASDBIDX1` magic, `u32` dim, `u64` count, 32-byte BLAKE3 digest of the
//! metadata file, then `count * dim` `f32` values.
//!
//! The digest binds the pair: an index written for a different metadata file
//! fails to load instead of resolving ids to the wrong records.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use assessdb_core::error::{Error, Result};
use assessdb_core::types::AssessmentRecord;

use crate::flat::FlatIndex;

pub const INDEX_FILE: &str = "assessments.index";
pub const METADATA_FILE: &str = "assessments.meta.json";

const MAGIC: &[u8; 8] = b"ASDBIDX1";
const HEADER_LEN: usize = 8 + 4 + 8 + 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStatus {
    pub index_present: bool,
    pub metadata_present: bool,
    pub records: Option<usize>,
    pub dim: Option<usize>,
}

pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path { &self.dir }
    pub fn index_path(&self) -> PathBuf { self.dir.join(INDEX_FILE) }
    pub fn metadata_path(&self) -> PathBuf { self.dir.join(METADATA_FILE) }

    /// Write both artifacts. Metadata goes first so a reader never sees an
    /// index header describing metadata that is not on disk yet.
    pub fn save(&self, index: &FlatIndex, records: &[AssessmentRecord]) -> Result<()> {
        if index.len() != records.len() {
            return Err(Error::IndexCorrupt(format!(
                "refusing to write {} vectors with {} metadata records",
                index.len(),
                records.len()
            )));
        }
        fs::create_dir_all(&self.dir)?;

        let metadata = serde_json::to_vec_pretty(records).map_err(std::io::Error::from)?;
        let digest = blake3::hash(&metadata);
        let dim = u32::try_from(index.dim())
            .map_err(|_| Error::IndexCorrupt(format!("dimension {} does not fit the header", index.dim())))?;

        let mut body = Vec::with_capacity(HEADER_LEN + std::mem::size_of_val(index.raw()));
        body.extend_from_slice(MAGIC);
        body.extend_from_slice(&dim.to_le_bytes());
        body.extend_from_slice(&(records.len() as u64).to_le_bytes());
        body.extend_from_slice(digest.as_bytes());
        for value in index.raw() {
            body.extend_from_slice(&value.to_le_bytes());
        }

        self.write_atomic(&self.metadata_path(), &metadata)?;
        self.write_atomic(&self.index_path(), &body)?;
        tracing::info!(dir = %self.dir.display(), records = records.len(), dim = index.dim(), "wrote index pair");
        Ok(())
    }

    /// Load both artifacts or nothing.
    pub fn load(&self) -> Result<(FlatIndex, Vec<AssessmentRecord>)> {
        let index_path = self.index_path();
        let metadata_path = self.metadata_path();
        for path in [&index_path, &metadata_path] {
            if !path.exists() {
                return Err(Error::IndexNotFound { path: path.clone() });
            }
        }

        let metadata = fs::read(&metadata_path)?;
        let body = fs::read(&index_path)?;
        let header = Header::parse(&body)?;

        if header.digest != *blake3::hash(&metadata).as_bytes() {
            return Err(Error::IndexCorrupt(format!(
                "{} was not written for {}",
                index_path.display(),
                metadata_path.display()
            )));
        }

        let records: Vec<AssessmentRecord> = serde_json::from_slice(&metadata)
            .map_err(|e| Error::IndexCorrupt(format!("metadata does not parse: {e}")))?;
        if records.len() != header.count {
            return Err(Error::IndexCorrupt(format!(
                "index holds {} vectors but metadata holds {} records",
                header.count,
                records.len()
            )));
        }

        let values = decode_f32s(&body[HEADER_LEN..])?;
        tracing::info!(records = records.len(), dim = header.dim, "loaded index pair");
        Ok((FlatIndex::from_raw(header.dim, values), records))
    }

    pub fn status(&self) -> IndexStatus {
        let index_present = self.index_path().exists();
        let metadata_present = self.metadata_path().exists();
        let header = fs::read(self.index_path()).ok().and_then(|b| Header::parse(&b).ok());
        IndexStatus {
            index_present,
            metadata_present,
            records: header.as_ref().map(|h| h.count),
            dim: header.as_ref().map(|h| h.dim),
        }
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

struct Header {
    dim: usize,
    count: usize,
    digest: [u8; 32],
}

impl Header {
    fn parse(body: &[u8]) -> Result<Self> {
        if body.len() < HEADER_LEN || &body[..8] != MAGIC {
            return Err(Error::IndexCorrupt("missing index header".into()));
        }
        let dim = u32::from_le_bytes([body[8], body[9], body[10], body[11]]) as usize;
        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&body[12..20]);
        let count = usize::try_from(u64::from_le_bytes(count_bytes))
            .map_err(|_| Error::IndexCorrupt("vector count overflows".into()))?;
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&body[20..HEADER_LEN]);

        if dim == 0 {
            return Err(Error::IndexCorrupt("zero dimension".into()));
        }
        let expected = count
            .checked_mul(dim)
            .and_then(|n| n.checked_mul(std::mem::size_of::<f32>()))
            .ok_or_else(|| Error::IndexCorrupt("vector payload size overflows".into()))?;
        if body.len() - HEADER_LEN != expected {
            return Err(Error::IndexCorrupt(format!(
                "vector payload is {} bytes, expected {expected}",
                body.len() - HEADER_LEN
            )));
        }
        Ok(Self { dim, count, digest })
    }
}

fn decode_f32s(bytes: &[u8]) -> Result<Vec<f32>> {
    let mut out = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        if !value.is_finite() {
            return Err(Error::IndexCorrupt("index contains non-finite values".into()));
        }
        out.push(value);
    }
    Ok(out)
}
