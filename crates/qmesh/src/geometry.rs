//! Renderable geometry for generic scene graphs.
//!
//! Quantized coordinates are rescaled into a caller-supplied box. X and Y
//! are centered on the box; Z rises from its floor.

use glam::{Vec2, Vec3};
use qmesh_decode::{DecodedTile, Edge, Indices, MAX_QUANTIZED, decode_oct_normals};

/// Axis-aligned box the tile is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingContainer {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingContainer {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of the given size centered on the origin in X and Y, with its
    /// floor at zero.
    #[must_use]
    pub fn from_size(size: Vec3) -> Self {
        let half = Vec3::new(size.x / 2.0, size.y / 2.0, 0.0);
        Self::new(-half, Vec3::new(half.x, half.y, size.z))
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    fn dequantize(&self, u: u16, v: u16, height: u16) -> Vec3 {
        let size = self.size();
        let scale = size / f32::from(MAX_QUANTIZED);
        let origin = Vec3::new(self.center().x, self.center().y, self.min.z);
        Vec3::new(
            f32::from(u) * scale.x - size.x / 2.0,
            f32::from(v) * scale.y - size.y / 2.0,
            f32::from(height) * scale.z,
        ) + origin
    }

    /// Map a position onto [0, 1] over the box's X and Y extent.
    ///
    /// A flat axis maps to 0.
    fn uv(&self, position: Vec3) -> Vec2 {
        let size = self.size();
        let ratio = |offset: f32, extent: f32| {
            if extent == 0.0 { 0.0 } else { offset / extent }
        };
        Vec2::new(
            ratio(position.x - self.min.x, size.x),
            ratio(position.y - self.min.y, size.y),
        )
    }
}

/// Where a geometry's normals came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalSource {
    /// Unpacked from the tile's oct-encoded normals.
    Decoded,
    /// Averaged from triangle faces.
    Computed,
}

/// Vertex attributes and index buffer ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableGeometry {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub normal_source: NormalSource,
}

/// Positions of one edge's vertices, for debug overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeVertices {
    pub edge: Edge,
    pub positions: Vec<Vec3>,
}

fn position_of(tile: &DecodedTile, container: &BoundingContainer, vertex: usize) -> Vec3 {
    container.dequantize(tile.u()[vertex], tile.v()[vertex], tile.heights()[vertex])
}

/// Build positions, UVs, normals and indices for `tile` inside `container`.
#[must_use]
pub fn build_geometry(tile: &DecodedTile, container: &BoundingContainer) -> RenderableGeometry {
    let positions: Vec<Vec3> = (0..tile.vertex_count())
        .map(|i| position_of(tile, container, i))
        .collect();
    let uvs = positions.iter().map(|&p| container.uv(p)).collect();
    let indices = tile.triangle_indices().to_u32_vec();

    let (normals, normal_source) = match tile.vertex_normals() {
        Some(packed) if packed.len() == 2 * positions.len() => {
            (decode_oct_normals(packed), NormalSource::Decoded)
        }
        _ => (
            compute_vertex_normals(&positions, tile.triangle_indices()),
            NormalSource::Computed,
        ),
    };

    RenderableGeometry {
        positions,
        uvs,
        normals,
        indices,
        normal_source,
    }
}

/// Area-weighted vertex normals from counter-clockwise triangles.
///
/// Vertices not referenced by any triangle point up. Triangles with an
/// index past `positions` are ignored.
#[must_use]
pub fn compute_vertex_normals(positions: &[Vec3], indices: &Indices) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; positions.len()];
    let indices: Vec<usize> = indices.iter().map(|i| i as usize).collect();

    for triangle in indices.chunks_exact(3) {
        let (a, b, c) = (triangle[0], triangle[1], triangle[2]);
        let (Some(&pa), Some(&pb), Some(&pc)) =
            (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        // Cross product length is twice the area, so larger faces weigh more.
        let face = (pb - pa).cross(pc - pa);
        sums[a] += face;
        sums[b] += face;
        sums[c] += face;
    }

    sums.into_iter()
        .map(|sum| sum.try_normalize().unwrap_or(Vec3::Z))
        .collect()
}

/// Dequantized positions of each non-empty edge list.
#[must_use]
pub fn highlight_edge_vertices(
    tile: &DecodedTile,
    container: &BoundingContainer,
) -> Vec<EdgeVertices> {
    let vertex_count = tile.vertex_count();
    Edge::ALL
        .into_iter()
        .filter(|&edge| !tile.edges().get(edge).is_empty())
        .map(|edge| EdgeVertices {
            edge,
            positions: tile
                .edges()
                .get(edge)
                .iter()
                .map(|i| i as usize)
                .filter(|&i| i < vertex_count)
                .map(|i| position_of(tile, container, i))
                .collect(),
        })
        .collect()
}
