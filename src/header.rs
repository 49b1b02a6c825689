//! The fixed 12-byte GLB header.
//!
//! | Offset | Size | Field          |
//! |--------|------|----------------|
//! | 0      | 4    | magic `glTF`   |
//! | 4      | 4    | version        |
//! | 8      | 4    | total length   |
//!
//! All fields are little-endian `u32`.  The version is reported but never
//! rejected; `total_length` bounds the chunk walk.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};
use thiserror::Error;

/// `b"glTF"` read as a little-endian `u32`.
pub const GLB_MAGIC: u32 = 0x4654_6C67;
/// Container version written by current glTF 2.0 exporters.
pub const GLB_VERSION: u32 = 2;
pub const HEADER_SIZE: usize = 12;

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("Truncated header: fewer than 12 bytes")]
    Truncated,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbHeader {
    pub magic:        u32,
    pub version:      u32,
    pub total_length: u32,
}

impl GlbHeader {
    /// Read the header without judging the magic; callers decide what a
    /// foreign magic means.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, HeaderError> {
        let mut buf = [0u8; HEADER_SIZE];
        reader.read_exact(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => HeaderError::Truncated,
            _ => HeaderError::Io(e),
        })?;
        let mut fields = &buf[..];
        Ok(Self {
            magic:        fields.read_u32::<LittleEndian>()?,
            version:      fields.read_u32::<LittleEndian>()?,
            total_length: fields.read_u32::<LittleEndian>()?,
        })
    }

    pub fn has_glb_magic(&self) -> bool {
        self.magic == GLB_MAGIC
    }
}
