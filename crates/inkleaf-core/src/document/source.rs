//! Random-access byte source: an owned buffer or a memory-mapped file.

use crate::error::Result;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Backs [`super::Document`] with either a caller-supplied buffer or a
/// memory-mapped file, both read-only and shared across worker threads
/// during parallel extraction (spec.md §5).
pub enum ByteSource {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl ByteSource {
    pub fn from_owned(data: Vec<u8>) -> Self {
        Self::Owned(data)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only for the document's lifetime; we
        // never write through it, and the `Document` that owns it is not
        // `Send` across a fork that could invalidate the mapping.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self::Mapped(mmap))
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Owned(v) => v,
            Self::Mapped(m) => m,
        }
    }
}
