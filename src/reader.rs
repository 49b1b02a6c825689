//! Container reader: the embedding surface of the crate.
//!
//! ```no_run
//! use glbscope::reader::{extract_metadata, Extraction};
//!
//! match extract_metadata("model.glb")? {
//!     Extraction::Metadata(map) => println!("{}", glbscope::render_pretty(&map)?),
//!     Extraction::NotThisFormat { .. } => println!("Not a valid GLB file"),
//!     Extraction::NoJsonChunk => {}
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The reader walks `ReadingHeader` → `ScanningChunks` and stops at the
//! first JSON chunk, at the end of the declared length, or at the first
//! failure.  A foreign magic and a container without JSON are outcomes, not
//! errors; see [`Extraction`].

use log::{debug, warn};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::Utf8Error;
use thiserror::Error;

use crate::chunk::{ChunkError, ChunkHeader, ChunkScanner, ChunkType};
use crate::header::{GlbHeader, HeaderError, GLB_VERSION};
use crate::metadata::{filter_document, RETAINED_KEYS};

#[derive(Error, Debug)]
pub enum GlbError {
    #[error("Truncated header: fewer than 12 bytes")]
    TruncatedHeader,
    #[error("Truncated chunk header at offset {offset}")]
    TruncatedChunkHeader { offset: u64 },
    #[error("Truncated chunk payload at offset {offset}: declared {declared} bytes, {available} available")]
    TruncatedChunkPayload { offset: u64, declared: u32, available: u64 },
    #[error("JSON chunk is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] Utf8Error),
    #[error("Malformed JSON chunk: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("JSON chunk top level is not an object")]
    NotAnObject,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<HeaderError> for GlbError {
    fn from(e: HeaderError) -> Self {
        match e {
            HeaderError::Truncated => GlbError::TruncatedHeader,
            HeaderError::Io(e)     => GlbError::Io(e),
        }
    }
}

impl From<ChunkError> for GlbError {
    fn from(e: ChunkError) -> Self {
        match e {
            ChunkError::TruncatedHeader { offset } => GlbError::TruncatedChunkHeader { offset },
            ChunkError::TruncatedPayload { offset, declared, available } => {
                GlbError::TruncatedChunkPayload { offset, declared, available }
            }
            ChunkError::Io(e) => GlbError::Io(e),
        }
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Non-error outcome of one extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Filtered top-level mapping of the first JSON chunk.
    Metadata(Map<String, Value>),
    /// The file does not start with the `glTF` magic.
    NotThisFormat { magic: u32 },
    /// The declared length was consumed without meeting a JSON chunk.
    NoJsonChunk,
}

impl Extraction {
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        match self {
            Extraction::Metadata(map) => Some(map),
            _ => None,
        }
    }
}

// ── ExtractOptions ────────────────────────────────────────────────────────────

/// Configuration for [`extract_metadata_with`] and [`extract_from_reader`].
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Top-level keys to keep from the JSON document.
    pub keys: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            keys: RETAINED_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Extract the `asset`, `scenes`, `nodes` and `cameras` descriptors from the
/// GLB file at `path`.
pub fn extract_metadata<P: AsRef<Path>>(path: P) -> Result<Extraction, GlbError> {
    extract_metadata_with(path, &ExtractOptions::default())
}

pub fn extract_metadata_with<P: AsRef<Path>>(
    path:    P,
    options: &ExtractOptions,
) -> Result<Extraction, GlbError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    debug!("opened {} ({} bytes)", path.display(), file_len);

    let mut reader = BufReader::new(file);
    let header = GlbHeader::read(&mut reader)?;
    if header.has_glb_magic() && header.total_length as u64 != file_len {
        warn!(
            "{}: header declares {} bytes but the file holds {}",
            path.display(),
            header.total_length,
            file_len
        );
    }
    scan_for_json(reader, header, options)
}

/// Same as [`extract_metadata_with`] over any byte source positioned at the
/// start of a container.
pub fn extract_from_reader<R: Read>(
    mut reader: R,
    options:    &ExtractOptions,
) -> Result<Extraction, GlbError> {
    let header = GlbHeader::read(&mut reader)?;
    scan_for_json(reader, header, options)
}

/// Header plus every chunk sub-header up to the declared length.  No payload
/// is decoded or buffered.
pub fn scan_chunks<P: AsRef<Path>>(path: P) -> Result<(GlbHeader, Vec<ChunkHeader>), GlbError> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = GlbHeader::read(&mut reader)?;
    if !header.has_glb_magic() {
        return Ok((header, Vec::new()));
    }
    let chunks = ChunkScanner::headers_only(reader, header.total_length)
        .map(|c| c.map(|c| c.header))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((header, chunks))
}

fn scan_for_json<R: Read>(
    reader:  R,
    header:  GlbHeader,
    options: &ExtractOptions,
) -> Result<Extraction, GlbError> {
    if !header.has_glb_magic() {
        debug!("magic 0x{:08X} is not glTF", header.magic);
        return Ok(Extraction::NotThisFormat { magic: header.magic });
    }
    debug!(
        "GLB version {}, declared length {}",
        header.version, header.total_length
    );
    if header.version != GLB_VERSION {
        warn!("unexpected GLB version {}; reading anyway", header.version);
    }

    let mut scanner = ChunkScanner::new(reader, header.total_length);
    while let Some(chunk) = scanner.next_chunk()? {
        if chunk.header.kind != ChunkType::Json {
            continue;
        }
        let payload = chunk.payload.unwrap_or_default();
        let metadata = decode_json_chunk(&payload, &options.keys)?;
        return Ok(Extraction::Metadata(metadata));
    }

    debug!("no JSON chunk before offset {}", scanner.offset());
    Ok(Extraction::NoJsonChunk)
}

fn decode_json_chunk(payload: &[u8], keys: &[String]) -> Result<Map<String, Value>, GlbError> {
    let text = std::str::from_utf8(payload)?;
    match serde_json::from_str::<Value>(text)? {
        Value::Object(document) => Ok(filter_document(document, keys)),
        _ => Err(GlbError::NotAnObject),
    }
}
