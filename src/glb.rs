use std::ops::Range;

use log::{debug, warn};

use crate::document::Document;
use crate::error::FormatError;

pub const GLB_MAGIC: u32 = u32::from_le_bytes(*b"glTF");
pub const GLB_VERSION: u32 = 2;
pub const CHUNK_JSON: u32 = u32::from_le_bytes(*b"JSON");
pub const CHUNK_BIN: u32 = u32::from_le_bytes(*b"BIN\0");

pub const HEADER_LEN: usize = 12;
pub const CHUNK_HEADER_LEN: usize = 8;

/// Fixed 12-byte file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbHeader {
    pub magic: u32,
    pub version: u32,
    pub total_length: u32,
}

/// Length and type tag preceding every chunk payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub length: u32,
    pub chunk_type: u32,
}

/// Decoded JSON chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataChunk {
    pub header: ChunkHeader,
    pub document: Document,
}

/// Binary chunk borrowed from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryChunk<'a> {
    pub header: ChunkHeader,
    /// Offset of the chunk header inside the container.
    pub offset: usize,
    pub payload: &'a [u8],
}

impl BinaryChunk<'_> {
    pub fn payload_range(&self) -> Range<usize> {
        let start = self.offset + CHUNK_HEADER_LEN;
        start..start + self.payload.len()
    }
}

/// Validated container.
#[derive(Debug, Clone, PartialEq)]
pub struct GlbAsset<'a> {
    pub header: GlbHeader,
    pub metadata: MetadataChunk,
    pub binary: BinaryChunk<'a>,
}

/// Validates and decodes a binary glTF container.
///
/// Layout (little-endian):
///
/// ```text
/// 0   magic   u32  "glTF"
/// 4   version u32  2
/// 8   length  u32  total container length
/// 12  chunk 0 [length u32][type u32 "JSON"][payload]
/// ..  chunk 1 [length u32][type u32 "BIN\0"][payload]
/// ```
///
/// Nothing is returned unless every check passes.
pub fn parse_glb(data: &[u8]) -> Result<GlbAsset<'_>, FormatError> {
    let header = GlbHeader {
        magic: read_u32(data, 0, "header")?,
        version: read_u32(data, 4, "header")?,
        total_length: read_u32(data, 8, "header")?,
    };
    if header.magic != GLB_MAGIC || header.version != GLB_VERSION {
        return Err(FormatError::BadMagicOrVersion {
            magic: header.magic,
            version: header.version,
        });
    }
    if header.total_length as usize != data.len() {
        warn!(
            "container declares {} bytes but {} were provided",
            header.total_length,
            data.len()
        );
    }

    let metadata_header = read_chunk_header(data, HEADER_LEN, "metadata chunk header")?;
    if metadata_header.chunk_type != CHUNK_JSON {
        return Err(FormatError::BadMetadataChunkType {
            found: metadata_header.chunk_type,
        });
    }
    let metadata_start = HEADER_LEN + CHUNK_HEADER_LEN;
    let metadata_bytes = read_region(
        data,
        metadata_start,
        metadata_header.length as usize,
        "metadata chunk",
    )?;
    let document = Document::from_slice(metadata_bytes)?;

    let binary_offset = metadata_start + metadata_bytes.len();
    let binary_header = read_chunk_header(data, binary_offset, "binary chunk header")?;
    if binary_header.chunk_type != CHUNK_BIN {
        return Err(FormatError::BadBinaryChunkType {
            found: binary_header.chunk_type,
        });
    }
    let payload = read_region(
        data,
        binary_offset + CHUNK_HEADER_LEN,
        binary_header.length as usize,
        "binary chunk",
    )?;

    require_mesh_primitive(&document)?;

    debug!(
        "parsed container: {} metadata bytes, {} binary bytes at offset {binary_offset}",
        metadata_header.length, binary_header.length
    );

    Ok(GlbAsset {
        header,
        metadata: MetadataChunk {
            header: metadata_header,
            document,
        },
        binary: BinaryChunk {
            header: binary_header,
            offset: binary_offset,
            payload,
        },
    })
}

fn require_mesh_primitive(document: &Document) -> Result<(), FormatError> {
    document
        .root()
        .field("meshes")
        .and_then(|meshes| meshes.index(0))
        .and_then(|mesh| mesh.field("primitives"))
        .and_then(|primitives| primitives.index(0))
        .and_then(|primitive| primitive.as_object().map(|_| ()))
        .map_err(|err| FormatError::NoMeshPrimitive(err.to_string()))
}

fn read_chunk_header(
    data: &[u8],
    offset: usize,
    region: &'static str,
) -> Result<ChunkHeader, FormatError> {
    let bytes = read_region(data, offset, CHUNK_HEADER_LEN, region)?;
    Ok(ChunkHeader {
        length: u32_from_le(&bytes[..4]),
        chunk_type: u32_from_le(&bytes[4..]),
    })
}

fn read_u32(data: &[u8], offset: usize, region: &'static str) -> Result<u32, FormatError> {
    read_region(data, offset, 4, region).map(u32_from_le)
}

fn read_region<'a>(
    data: &'a [u8],
    offset: usize,
    length: usize,
    region: &'static str,
) -> Result<&'a [u8], FormatError> {
    offset
        .checked_add(length)
        .and_then(|end| data.get(offset..end))
        .ok_or(FormatError::BufferOverrun {
            region,
            offset,
            length,
            available: data.len(),
        })
}

fn u32_from_le(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    u32::from_le_bytes(word)
}
