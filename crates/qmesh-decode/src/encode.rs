//! Reference encoder.
//!
//! Produces the wire format [`crate::decode`] reads. Used to build test
//! fixtures and to re-serialize tiles from tooling.

use crate::error::EncodeError;
use crate::extensions::pack_extensions;
use crate::header::{HEADER_SIZE, write_header};
use crate::indices::{IndexWidth, pack_edge_indices, pack_triangle_indices};
use crate::vertices::pack_vertices;
use crate::DecodedTile;

/// Encode a tile.
///
/// The index width is chosen from the vertex count, not from the width the
/// tile's arrays happen to be stored at. Triangle indices must appear in
/// high-water-mark order: each index is at most one above the largest
/// index before it.
pub fn encode(tile: &DecodedTile) -> Result<Vec<u8>, EncodeError> {
    let mesh = &tile.mesh;
    if mesh.vertex_data.len() % 3 != 0 {
        return Err(EncodeError::RaggedVertexData(mesh.vertex_data.len()));
    }
    let vertex_count = mesh.vertex_count();
    if u32::try_from(vertex_count).is_err() {
        return Err(EncodeError::TooManyVertices {
            count: vertex_count,
        });
    }
    let width = IndexWidth::for_vertex_count(vertex_count);

    let mut out = Vec::with_capacity(HEADER_SIZE + mesh.vertex_data.len() * 2);
    write_header(&tile.header, &mut out);
    pack_vertices(&mesh.vertex_data, &mut out);
    pack_triangle_indices(&mesh.triangle_indices, width, &mut out)?;
    pack_edge_indices(&mesh.edges, width, &mut out);
    pack_extensions(&mesh.extensions, &mut out);
    Ok(out)
}
