pub mod header;
pub mod chunk;
pub mod metadata;
pub mod reader;

pub use header::{GlbHeader, GLB_MAGIC};
pub use chunk::{Chunk, ChunkHeader, ChunkScanner, ChunkType};
pub use metadata::{filter_document, render_pretty, RETAINED_KEYS};
pub use reader::{extract_metadata, extract_metadata_with, extract_from_reader, scan_chunks, Extraction, ExtractOptions, GlbError};
