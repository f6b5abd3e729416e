//! Flat stand-in tiles for failed requests.

use std::sync::{Arc, LazyLock};

use qmesh_decode::{
    BoundingSphere, DecodedTile, EdgeIndices, Header, Indices, MAX_QUANTIZED, TileMesh,
};

use crate::tiling::{TileKey, TilingScheme};

const Q: u16 = MAX_QUANTIZED;

/// A flat square with two triangles, shared by every placeholder tile.
static PLACEHOLDER_MESH: LazyLock<Arc<TileMesh>> = LazyLock::new(|| {
    Arc::new(TileMesh {
        vertex_data: vec![
            0, Q, Q, 0, // u
            0, 0, Q, Q, // v
            0, 0, 0, 0, // height
        ],
        triangle_indices: Indices::U16(vec![0, 1, 2, 0, 2, 3]),
        edges: EdgeIndices {
            west: Indices::U16(vec![0, 3]),
            south: Indices::U16(vec![0, 1]),
            east: Indices::U16(vec![1, 2]),
            north: Indices::U16(vec![3, 2]),
        },
        extensions: Vec::new(),
    })
});

/// The mesh body every placeholder tile points at.
#[must_use]
pub fn placeholder_mesh() -> Arc<TileMesh> {
    Arc::clone(&PLACEHOLDER_MESH)
}

/// Build a zero-height tile covering `key`.
///
/// Only the header depends on the key; the body is the shared
/// [`placeholder_mesh`].
#[must_use]
pub fn build_placeholder_tile<S: TilingScheme + ?Sized>(key: TileKey, scheme: &S) -> DecodedTile {
    let ellipsoid = scheme.ellipsoid();
    let rectangle = scheme.tile_x_y_to_rectangle(key.x, key.y, key.level);
    let native = scheme.tile_x_y_to_native_rectangle(key.x, key.y, key.level);

    let center = ellipsoid.cartographic_to_cartesian(rectangle.center());
    let header = Header {
        center,
        minimum_height: 0.0,
        maximum_height: 0.0,
        bounding_sphere: BoundingSphere::new(center, native.height()),
        horizon_occlusion_point: ellipsoid.transform_position_to_scaled_space(center),
    };

    DecodedTile::new(header, placeholder_mesh())
}
