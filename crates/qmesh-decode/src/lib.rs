//! Decode quantized-mesh terrain tiles.
//!
//! This crate provides pure synchronous decoding of the quantized-mesh
//! binary format into an in-memory tile. All functions are designed to be
//! called from any threading context - the library user controls
//! parallelism.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives
//! - **Validated**: A decoded tile is either fully valid or an error
//! - **Web-compatible**: Compiles to WASM
//!
//! # Key functions
//!
//! - [`decode`]: Decode a full tile, including extensions
//! - [`decode_with`]: Decode up to a chosen [`DecodingStep`]
//! - [`decode_oct`]: Unpack an oct-encoded vertex normal
//! - [`encode`]: Reference encoder, the inverse of [`decode`]

mod decoder;
mod error;
mod reader;

pub mod encode;
pub mod extensions;
pub mod header;
pub mod indices;
pub mod normals;
pub mod vertices;

use std::sync::Arc;

pub use decoder::{DecodeOptions, DecodingStep, decode, decode_with};
pub use encode::encode;
pub use error::{DecodeError, DecodeResult, EncodeError};
pub use extensions::{Extension, ExtensionId, WaterMask};
pub use header::{BoundingSphere, HEADER_SIZE, Header};
pub use indices::{Edge, EdgeIndices, IndexWidth, Indices};
pub use normals::{decode_oct, decode_oct_normals};
pub use vertices::{MAX_QUANTIZED, zigzag_decode, zigzag_encode};

/// Mesh body of a tile: everything after the header.
///
/// `vertex_data` holds `3 * vertex_count` quantized values laid out as
/// [all U][all V][all height].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileMesh {
    pub vertex_data: Vec<u16>,
    pub triangle_indices: Indices,
    pub edges: EdgeIndices,
    pub extensions: Vec<Extension>,
}

impl TileMesh {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_data.len() / 3
    }
}

/// A decoded tile.
///
/// The body sits behind an [`Arc`] so many tiles can share one immutable
/// mesh, as placeholder tiles do.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTile {
    pub header: Header,
    pub mesh: Arc<TileMesh>,
    /// Last section that was decoded. Later sections are empty.
    pub decoded_through: DecodingStep,
}

impl DecodedTile {
    #[must_use]
    pub fn new(header: Header, mesh: Arc<TileMesh>) -> Self {
        Self {
            header,
            mesh,
            decoded_through: DecodingStep::Extensions,
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    #[must_use]
    pub fn vertex_data(&self) -> &[u16] {
        &self.mesh.vertex_data
    }

    /// Quantized U (east) coordinates.
    #[must_use]
    pub fn u(&self) -> &[u16] {
        &self.mesh.vertex_data[..self.vertex_count()]
    }

    /// Quantized V (north) coordinates.
    #[must_use]
    pub fn v(&self) -> &[u16] {
        let n = self.vertex_count();
        &self.mesh.vertex_data[n..2 * n]
    }

    /// Quantized heights.
    #[must_use]
    pub fn heights(&self) -> &[u16] {
        let n = self.vertex_count();
        &self.mesh.vertex_data[2 * n..3 * n]
    }

    #[must_use]
    pub fn triangle_indices(&self) -> &Indices {
        &self.mesh.triangle_indices
    }

    #[must_use]
    pub fn edges(&self) -> &EdgeIndices {
        &self.mesh.edges
    }

    /// Packed oct-encoded normals, two bytes per vertex, if the tile has them.
    #[must_use]
    pub fn vertex_normals(&self) -> Option<&[u8]> {
        self.mesh.extensions.iter().find_map(|e| match e {
            Extension::OctVertexNormals(bytes) => Some(bytes.as_slice()),
            _ => None,
        })
    }

    #[must_use]
    pub fn water_mask(&self) -> Option<&WaterMask> {
        self.mesh.extensions.iter().find_map(|e| match e {
            Extension::WaterMask(mask) => Some(mask),
            _ => None,
        })
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.mesh.extensions.iter().find_map(|e| match e {
            Extension::Metadata(value) => Some(value),
            _ => None,
        })
    }
}
