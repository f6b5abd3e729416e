//! Section-by-section tile decoding.

use std::sync::Arc;

use crate::error::DecodeResult;
use crate::extensions::unpack_extensions;
use crate::header::read_header;
use crate::indices::{IndexWidth, Indices, unpack_edge_indices, unpack_triangle_indices};
use crate::reader::Reader;
use crate::vertices::unpack_vertices;
use crate::{DecodedTile, TileMesh};

/// Sections of a tile, in wire order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DecodingStep {
    Header,
    Vertices,
    TriangleIndices,
    EdgeIndices,
    #[default]
    Extensions,
}

impl DecodingStep {
    pub const ALL: [DecodingStep; 5] = [
        DecodingStep::Header,
        DecodingStep::Vertices,
        DecodingStep::TriangleIndices,
        DecodingStep::EdgeIndices,
        DecodingStep::Extensions,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DecodingStep::Header => "header",
            DecodingStep::Vertices => "vertices",
            DecodingStep::TriangleIndices => "triangleIndices",
            DecodingStep::EdgeIndices => "edgeIndices",
            DecodingStep::Extensions => "extensions",
        }
    }

    /// Look up a step by its [`DecodingStep::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.name() == name)
    }
}

/// Options for [`decode_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Stop after this section. Defaults to decoding everything.
    pub max_decoding_step: DecodingStep,
}

/// Decode a complete tile.
pub fn decode(bytes: &[u8]) -> DecodeResult<DecodedTile> {
    decode_with(bytes, &DecodeOptions::default())
}

/// Decode a tile up to `options.max_decoding_step`.
///
/// Sections after the requested step are left empty and the returned
/// tile's `decoded_through` records where decoding stopped.
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> DecodeResult<DecodedTile> {
    let max = options.max_decoding_step;
    let mut reader = Reader::new(bytes);
    let header = read_header(&mut reader)?;
    let mut mesh = TileMesh::default();

    let tile = |mesh: TileMesh, step: DecodingStep| DecodedTile {
        header,
        mesh: Arc::new(mesh),
        decoded_through: step,
    };

    if max == DecodingStep::Header {
        return Ok(tile(mesh, DecodingStep::Header));
    }

    mesh.vertex_data = unpack_vertices(&mut reader)?;
    let vertex_count = mesh.vertex_count();
    let width = IndexWidth::for_vertex_count(vertex_count);
    mesh.triangle_indices = Indices::empty(width);
    if max == DecodingStep::Vertices {
        return Ok(tile(mesh, DecodingStep::Vertices));
    }

    mesh.triangle_indices = unpack_triangle_indices(&mut reader, width, vertex_count)?;
    if max == DecodingStep::TriangleIndices {
        return Ok(tile(mesh, DecodingStep::TriangleIndices));
    }

    mesh.edges = unpack_edge_indices(&mut reader, width, vertex_count)?;
    if max == DecodingStep::EdgeIndices {
        return Ok(tile(mesh, DecodingStep::EdgeIndices));
    }

    mesh.extensions = unpack_extensions(&mut reader, vertex_count)?;
    Ok(tile(mesh, DecodingStep::Extensions))
}
