//! Terrain provider and mesh building for quantized-mesh tiles.
//!
//! Sits on top of [`qmesh_decode`] and turns decoded tiles into the two
//! shapes consumers want:
//!
//! - [`ProviderRecord`]: bounding volumes, skirts and availability for a
//!   globe renderer
//! - [`RenderableGeometry`]: attribute arrays fitted into a box for a
//!   generic scene graph
//!
//! Fetching goes through [`Client`], and [`TerrainProvider`] replaces any
//! tile that fails to load with a flat placeholder.
//!
//! # Example
//!
//! ```no_run
//! use qmesh::{MemoryCache, ProviderOptions, TerrainProvider, TileKey, UrlTemplate};
//! use qmesh::WebMercatorTilingScheme;
//!
//! # async fn run() {
//! let provider = TerrainProvider::new(
//!     WebMercatorTilingScheme::default(),
//!     UrlTemplate::new("https://tiles.example.com/{z}/{x}/{reverseY}.terrain"),
//!     ProviderOptions::default(),
//!     MemoryCache::new(),
//! );
//! let record = provider.request_tile_geometry(TileKey::new(0, 0, 0)).await;
//! println!("{} vertices", record.mesh.vertex_count());
//! # }
//! ```

mod cache;
mod client;
mod error;

pub mod geodesy;
pub mod geometry;
pub mod obb;
pub mod options;
pub mod placeholder;
pub mod provider;
pub mod record;
pub mod tiling;

pub use cache::{Cache, MemoryCache, NoCache};
pub use client::{Client, UrlFn};
pub use error::Error;
pub use geodesy::{Cartographic, Ellipsoid, Rectangle};
pub use geometry::{
    BoundingContainer, EdgeVertices, NormalSource, RenderableGeometry, build_geometry,
    compute_vertex_normals, highlight_edge_vertices,
};
pub use obb::OrientedBoundingBox;
pub use options::{ProviderOptions, UrlTemplate};
pub use placeholder::{build_placeholder_tile, placeholder_mesh};
pub use provider::TerrainProvider;
pub use record::{
    ALL_CHILDREN, ProviderRecord, SkirtHeights, build_provider_record, level_zero_geometric_error,
};
pub use tiling::{GeographicTilingScheme, TileKey, TilingScheme, WebMercatorTilingScheme};

pub use qmesh_decode::{
    BoundingSphere, DecodeError, DecodeOptions, DecodedTile, DecodingStep, Edge, Header, TileMesh,
};
