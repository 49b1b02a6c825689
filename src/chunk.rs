//! GLB chunk framing and the lazy chunk scanner.
//!
//! Every chunk is an 8-byte sub-header followed by `length` payload bytes:
//!
//! | Offset | Size     | Field   |
//! |--------|----------|---------|
//! | 0      | 4        | length  |
//! | 4      | 4        | type    |
//! | 8      | `length` | payload |
//!
//! Chunks start right after the 12-byte container header and follow each
//! other back to back.  [`ChunkScanner`] walks them one at a time and only
//! buffers the payloads its caller asked for; everything else is drained
//! without being held in memory, so a large `BIN` chunk costs a read, not an
//! allocation.

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;
use std::fmt;
use std::io::{self, Read};
use thiserror::Error;

use crate::header::HEADER_SIZE;

pub const CHUNK_HEADER_SIZE: usize = 8;
/// `b"JSON"` read as a little-endian `u32`.
pub const CHUNK_TYPE_JSON: u32 = 0x4E4F_534A;
/// `b"BIN\0"` read as a little-endian `u32`.
pub const CHUNK_TYPE_BIN: u32 = 0x004E_4942;

#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("Truncated chunk header at offset {offset}")]
    TruncatedHeader { offset: u64 },
    #[error("Truncated chunk payload at offset {offset}: declared {declared} bytes, {available} available")]
    TruncatedPayload { offset: u64, declared: u32, available: u64 },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── Chunk type ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    Json,
    Bin,
    Unknown(u32),
}

impl From<u32> for ChunkType {
    fn from(tag: u32) -> Self {
        match tag {
            CHUNK_TYPE_JSON => ChunkType::Json,
            CHUNK_TYPE_BIN  => ChunkType::Bin,
            other           => ChunkType::Unknown(other),
        }
    }
}

impl From<ChunkType> for u32 {
    fn from(kind: ChunkType) -> u32 {
        match kind {
            ChunkType::Json         => CHUNK_TYPE_JSON,
            ChunkType::Bin          => CHUNK_TYPE_BIN,
            ChunkType::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkType::Json => f.write_str("JSON"),
            ChunkType::Bin  => f.write_str("BIN"),
            ChunkType::Unknown(tag) => {
                // Printable tags read better as text; anything else as hex.
                let bytes = tag.to_le_bytes();
                if bytes.iter().all(|b| b.is_ascii_graphic()) {
                    write!(f, "{}", String::from_utf8_lossy(&bytes))
                } else {
                    write!(f, "0x{tag:08X}")
                }
            }
        }
    }
}

// ── Chunk header ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Absolute offset of the sub-header from the start of the file.
    pub offset: u64,
    pub length: u32,
    pub kind:   ChunkType,
}

impl ChunkHeader {
    /// Read an 8-byte sub-header located at `offset`.
    pub fn read<R: Read>(mut reader: R, offset: u64) -> Result<Self, ChunkError> {
        let mut buf = [0u8; CHUNK_HEADER_SIZE];
        reader.read_exact(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => ChunkError::TruncatedHeader { offset },
            _ => ChunkError::Io(e),
        })?;
        let mut fields = &buf[..];
        let length = fields.read_u32::<LittleEndian>()?;
        let kind   = ChunkType::from(fields.read_u32::<LittleEndian>()?);
        Ok(Self { offset, length, kind })
    }

    /// Offset of the byte following this chunk's payload.
    pub fn end(&self) -> u64 {
        self.offset + CHUNK_HEADER_SIZE as u64 + self.length as u64
    }
}

/// One scanned chunk.  `payload` is `Some` only for chunk types the scanner
/// was told to load.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub header:  ChunkHeader,
    pub payload: Option<Vec<u8>>,
}

// ── Scanner ───────────────────────────────────────────────────────────────────

/// Lazily walks the chunks of a container whose 12-byte header has already
/// been consumed from `reader`.
///
/// A new chunk is started only while the cursor is below `total_length`.
/// The scanner is fused: after the end of the declared length or after the
/// first error it yields nothing more.
pub struct ChunkScanner<R: Read> {
    reader:       R,
    offset:       u64,
    total_length: u64,
    load:         fn(ChunkType) -> bool,
    done:         bool,
}

impl<R: Read> ChunkScanner<R> {
    /// Scanner that buffers JSON payloads and skips everything else.
    pub fn new(reader: R, total_length: u32) -> Self {
        Self::with_loader(reader, total_length, |kind| kind == ChunkType::Json)
    }

    /// Scanner that never buffers a payload; only headers are reported.
    pub fn headers_only(reader: R, total_length: u32) -> Self {
        Self::with_loader(reader, total_length, |_| false)
    }

    pub fn with_loader(reader: R, total_length: u32, load: fn(ChunkType) -> bool) -> Self {
        Self {
            reader,
            offset: HEADER_SIZE as u64,
            total_length: total_length as u64,
            load,
            done: false,
        }
    }

    /// Current absolute offset from the start of the file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, ChunkError> {
        if self.done {
            return Ok(None);
        }
        if self.offset >= self.total_length {
            self.done = true;
            return Ok(None);
        }
        let result = self.read_one();
        if result.is_err() {
            self.done = true;
        }
        result.map(Some)
    }

    fn read_one(&mut self) -> Result<Chunk, ChunkError> {
        let header = ChunkHeader::read(&mut self.reader, self.offset)?;
        debug!(
            "chunk at offset {}: type {}, {} bytes",
            header.offset, header.kind, header.length
        );

        let declared = header.length as u64;
        let mut body = (&mut self.reader).take(declared);
        let (payload, available) = if (self.load)(header.kind) {
            // Grow with the data actually present rather than trusting the
            // declared length for the allocation.
            let mut buf = Vec::new();
            let n = body.read_to_end(&mut buf)? as u64;
            (Some(buf), n)
        } else {
            (None, io::copy(&mut body, &mut io::sink())?)
        };

        if available < declared {
            return Err(ChunkError::TruncatedPayload {
                offset: header.offset,
                declared: header.length,
                available,
            });
        }

        self.offset = header.end();
        Ok(Chunk { header, payload })
    }
}

impl<R: Read> Iterator for ChunkScanner<R> {
    type Item = Result<Chunk, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Cursor;

    fn push_chunk(buf: &mut Vec<u8>, kind: u32, payload: &[u8]) {
        buf.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
        buf.write_u32::<LittleEndian>(kind).unwrap();
        buf.extend_from_slice(payload);
    }

    #[test]
    fn tags_match_ascii() {
        assert_eq!(CHUNK_TYPE_JSON.to_le_bytes(), *b"JSON");
        assert_eq!(CHUNK_TYPE_BIN.to_le_bytes(), *b"BIN\0");
    }

    #[test]
    fn chunk_type_display() {
        assert_eq!(ChunkType::Json.to_string(), "JSON");
        assert_eq!(ChunkType::Bin.to_string(), "BIN");
        assert_eq!(ChunkType::from(u32::from_le_bytes(*b"KTX2")).to_string(), "KTX2");
        assert_eq!(ChunkType::Unknown(1).to_string(), "0x00000001");
    }

    #[test]
    fn walks_chunks_and_loads_only_json() {
        let mut body = Vec::new();
        push_chunk(&mut body, CHUNK_TYPE_BIN, &[7u8; 16]);
        push_chunk(&mut body, CHUNK_TYPE_JSON, b"{}");
        let total = (HEADER_SIZE + body.len()) as u32;

        let chunks: Vec<Chunk> = ChunkScanner::new(Cursor::new(body), total)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].header.kind, ChunkType::Bin);
        assert_eq!(chunks[0].header.offset, 12);
        assert!(chunks[0].payload.is_none());
        assert_eq!(chunks[1].header.offset, 12 + 8 + 16);
        assert_eq!(chunks[1].payload.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn stops_at_declared_length() {
        let mut body = Vec::new();
        push_chunk(&mut body, CHUNK_TYPE_BIN, &[0u8; 4]);
        // Trailing bytes past total_length must never be interpreted.
        push_chunk(&mut body, CHUNK_TYPE_JSON, b"{}");
        let total = (HEADER_SIZE + 8 + 4) as u32;

        let mut scanner = ChunkScanner::new(Cursor::new(body), total);
        assert!(scanner.next_chunk().unwrap().is_some());
        assert!(scanner.next_chunk().unwrap().is_none());
        assert_eq!(scanner.offset(), total as u64);
    }

    #[test]
    fn short_sub_header_is_reported() {
        let body = vec![2u8, 0, 0, 0, b'J'];
        let err = ChunkScanner::new(Cursor::new(body), 100).next_chunk().unwrap_err();
        assert!(matches!(err, ChunkError::TruncatedHeader { offset: 12 }));
    }

    #[test]
    fn short_payload_is_reported_for_skipped_chunks() {
        let mut body = Vec::new();
        body.write_u32::<LittleEndian>(64).unwrap();
        body.write_u32::<LittleEndian>(CHUNK_TYPE_BIN).unwrap();
        body.extend_from_slice(&[0u8; 10]);

        let mut scanner = ChunkScanner::new(Cursor::new(body), 1000);
        match scanner.next_chunk() {
            Err(ChunkError::TruncatedPayload { offset, declared, available }) => {
                assert_eq!(offset, 12);
                assert_eq!(declared, 64);
                assert_eq!(available, 10);
            }
            other => panic!("expected truncated payload, got {other:?}"),
        }
        // Fused after the error.
        assert!(scanner.next().is_none());
    }

    #[test]
    fn headers_only_never_buffers() {
        let mut body = Vec::new();
        push_chunk(&mut body, CHUNK_TYPE_JSON, b"{\"asset\":{}}");
        let total = (HEADER_SIZE + body.len()) as u32;

        let chunk = ChunkScanner::headers_only(Cursor::new(body), total)
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(chunk.header.kind, ChunkType::Json);
        assert!(chunk.payload.is_none());
    }
}
