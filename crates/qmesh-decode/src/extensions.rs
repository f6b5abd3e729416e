//! Extension blocks trailing the edge sections.
//!
//! Each block is a `u8` identifier, a `u32` payload length and the payload.
//! Identifiers this crate does not understand are skipped by length.

use crate::error::{DecodeError, DecodeResult};
use crate::reader::Reader;

/// Side length of a water mask grid.
pub const WATER_MASK_SIZE: usize = 256;

/// Wire identifier of an extension block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionId {
    OctVertexNormals,
    WaterMask,
    Metadata,
    Unrecognized(u8),
}

impl ExtensionId {
    #[must_use]
    pub fn from_u8(id: u8) -> Self {
        match id {
            1 => Self::OctVertexNormals,
            2 => Self::WaterMask,
            4 => Self::Metadata,
            other => Self::Unrecognized(other),
        }
    }

    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            Self::OctVertexNormals => 1,
            Self::WaterMask => 2,
            Self::Metadata => 4,
            Self::Unrecognized(id) => id,
        }
    }
}

/// Land/water classification for a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaterMask {
    /// Whole tile is land (0) or water (255).
    Uniform(u8),
    /// 256×256 grid, row-major from the north-west corner.
    Grid(Vec<u8>),
}

/// A decoded extension block.
#[derive(Debug, Clone, PartialEq)]
pub enum Extension {
    /// Two oct-encoded bytes per vertex, see [`crate::normals`].
    OctVertexNormals(Vec<u8>),
    WaterMask(WaterMask),
    /// JSON object, typically carrying child tile availability.
    Metadata(serde_json::Value),
}

impl Extension {
    #[must_use]
    pub fn id(&self) -> ExtensionId {
        match self {
            Self::OctVertexNormals(_) => ExtensionId::OctVertexNormals,
            Self::WaterMask(_) => ExtensionId::WaterMask,
            Self::Metadata(_) => ExtensionId::Metadata,
        }
    }
}

/// Read extension blocks until the buffer is exhausted.
pub(crate) fn unpack_extensions(
    reader: &mut Reader<'_>,
    vertex_count: usize,
) -> DecodeResult<Vec<Extension>> {
    let mut extensions = Vec::new();

    while !reader.is_empty() {
        let id = reader.read_u8("extension header")?;
        let length = reader.read_u32("extension header")? as usize;
        let payload = reader.take_declared(length, "extension")?;

        match ExtensionId::from_u8(id) {
            ExtensionId::OctVertexNormals => {
                if payload.len() != vertex_count * 2 {
                    return Err(DecodeError::InvalidExtension {
                        id,
                        reason: format!(
                            "expected {} normal bytes for {vertex_count} vertices, got {}",
                            vertex_count * 2,
                            payload.len()
                        ),
                    });
                }
                extensions.push(Extension::OctVertexNormals(payload.to_vec()));
            }
            ExtensionId::WaterMask => {
                let mask = match payload.len() {
                    1 => WaterMask::Uniform(payload[0]),
                    n if n == WATER_MASK_SIZE * WATER_MASK_SIZE => WaterMask::Grid(payload.to_vec()),
                    n => {
                        return Err(DecodeError::InvalidExtension {
                            id,
                            reason: format!("water mask must be 1 or 65536 bytes, got {n}"),
                        });
                    }
                };
                extensions.push(Extension::WaterMask(mask));
            }
            ExtensionId::Metadata => {
                let mut block = Reader::new(payload);
                let json_length = block.read_u32("metadata")? as usize;
                let json = block.take_declared(json_length, "metadata")?;
                extensions.push(Extension::Metadata(serde_json::from_slice(json)?));
            }
            ExtensionId::Unrecognized(_) => {}
        }
    }

    Ok(extensions)
}

/// Inverse of [`unpack_extensions`].
pub(crate) fn pack_extensions(extensions: &[Extension], out: &mut Vec<u8>) {
    for extension in extensions {
        let payload = match extension {
            Extension::OctVertexNormals(bytes) => bytes.clone(),
            Extension::WaterMask(WaterMask::Uniform(value)) => vec![*value],
            Extension::WaterMask(WaterMask::Grid(grid)) => grid.clone(),
            Extension::Metadata(value) => {
                let json = value.to_string().into_bytes();
                let mut payload = len_u32(json.len()).to_le_bytes().to_vec();
                payload.extend_from_slice(&json);
                payload
            }
        };
        out.push(extension.id().to_u8());
        out.extend_from_slice(&len_u32(payload.len()).to_le_bytes());
        out.extend_from_slice(&payload);
    }
}

fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
