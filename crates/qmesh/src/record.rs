//! Provider records: what a globe renderer needs to place a tile.

use std::f64::consts::TAU;
use std::sync::Arc;

use glam::DVec3;
use qmesh_decode::{BoundingSphere, DecodedTile, EdgeIndices, Header, TileMesh};

use crate::geodesy::{Ellipsoid, Rectangle};
use crate::obb::OrientedBoundingBox;
use crate::options::ProviderOptions;
use crate::tiling::{TileKey, TilingScheme};

/// Child mask with all four quadrants present.
pub const ALL_CHILDREN: u8 = 0b1111;

/// Heightmap quality factor used by the level-zero error heuristic.
const HEIGHTMAP_TERRAIN_QUALITY: f64 = 0.25;

/// Skirt heights per edge, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkirtHeights {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl SkirtHeights {
    #[must_use]
    pub fn uniform(height: f64) -> Self {
        Self {
            west: height,
            south: height,
            east: height,
            north: height,
        }
    }
}

/// Everything a terrain consumer needs to render and cull one tile.
///
/// The quantized buffers are shared with the decoded tile, not copied.
#[derive(Debug, Clone)]
pub struct ProviderRecord {
    pub key: TileKey,
    pub minimum_height: f64,
    pub maximum_height: f64,
    pub mesh: Arc<TileMesh>,
    pub bounding_sphere: BoundingSphere,
    /// Omitted for tiles wider than [`ProviderOptions::obb_max_rectangle_width`].
    pub oriented_bounding_box: Option<OrientedBoundingBox>,
    pub horizon_occlusion_point: DVec3,
    pub skirt_heights: SkirtHeights,
    pub child_tile_mask: u8,
    pub credits: Vec<String>,
}

impl ProviderRecord {
    #[must_use]
    pub fn quantized_vertices(&self) -> &[u16] {
        &self.mesh.vertex_data
    }

    #[must_use]
    pub fn edges(&self) -> &EdgeIndices {
        &self.mesh.edges
    }
}

/// Wrap a decoded tile into a provider record.
///
/// The bounding sphere and occlusion point are taken from the header as-is.
pub fn build_provider_record<S: TilingScheme + ?Sized>(
    tile: &DecodedTile,
    key: TileKey,
    scheme: &S,
    options: &ProviderOptions,
) -> ProviderRecord {
    let rectangle = scheme.tile_x_y_to_rectangle(key.x, key.y, key.level);
    let header = &tile.header;

    ProviderRecord {
        key,
        minimum_height: f64::from(header.minimum_height),
        maximum_height: f64::from(header.maximum_height),
        mesh: Arc::clone(&tile.mesh),
        bounding_sphere: header.bounding_sphere,
        oriented_bounding_box: oriented_bounding_box(
            &rectangle,
            header,
            scheme.ellipsoid(),
            options,
        ),
        horizon_occlusion_point: header.horizon_occlusion_point,
        skirt_heights: SkirtHeights::uniform(options.skirt_height),
        child_tile_mask: ALL_CHILDREN,
        credits: options.credit.iter().cloned().collect(),
    }
}

/// Fit a box to the tile, unless the rectangle is too wide to fit reliably.
#[must_use]
pub fn oriented_bounding_box(
    rectangle: &Rectangle,
    header: &Header,
    ellipsoid: &Ellipsoid,
    options: &ProviderOptions,
) -> Option<OrientedBoundingBox> {
    if rectangle.width() >= options.obb_max_rectangle_width {
        return None;
    }
    OrientedBoundingBox::from_rectangle(
        rectangle,
        f64::from(header.minimum_height),
        f64::from(header.maximum_height),
        ellipsoid,
    )
}

/// Estimated geometric error of a level-zero tile, treating it as a
/// `heightmap_width` square heightmap.
#[must_use]
pub fn level_zero_geometric_error(
    ellipsoid: &Ellipsoid,
    heightmap_width: u32,
    tiles_x_at_level_zero: u32,
) -> f64 {
    ellipsoid.maximum_radius() * TAU * HEIGHTMAP_TERRAIN_QUALITY
        / (f64::from(heightmap_width) * f64::from(tiles_x_at_level_zero))
}

/// Error at `level`, halving once per level.
#[must_use]
pub fn geometric_error_at_level(level_zero_error: f64, level: u32) -> f64 {
    level_zero_error / 2f64.powi(i32::try_from(level).unwrap_or(i32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OBB_MAX_RECTANGLE_WIDTH;
    use crate::placeholder::build_placeholder_tile;
    use crate::tiling::{GeographicTilingScheme, WebMercatorTilingScheme};

    fn flat_header() -> Header {
        Header {
            center: DVec3::ZERO,
            minimum_height: 0.0,
            maximum_height: 100.0,
            bounding_sphere: BoundingSphere::new(DVec3::ZERO, 1.0),
            horizon_occlusion_point: DVec3::ZERO,
        }
    }

    #[test]
    fn test_obb_just_below_threshold() {
        let rectangle = Rectangle::new(0.0, -0.1, OBB_MAX_RECTANGLE_WIDTH - 1e-7, 0.1);
        let obb = oriented_bounding_box(
            &rectangle,
            &flat_header(),
            &Ellipsoid::WGS84,
            &ProviderOptions::default(),
        );
        assert!(obb.is_some());
    }

    #[test]
    fn test_obb_just_above_threshold() {
        let rectangle = Rectangle::new(0.0, -0.1, OBB_MAX_RECTANGLE_WIDTH + 1e-7, 0.1);
        let obb = oriented_bounding_box(
            &rectangle,
            &flat_header(),
            &Ellipsoid::WGS84,
            &ProviderOptions::default(),
        );
        assert!(obb.is_none());
    }

    #[test]
    fn test_obb_threshold_is_configurable() {
        let rectangle = Rectangle::new(0.0, -0.1, 0.5, 0.1);
        let options = ProviderOptions {
            obb_max_rectangle_width: 0.25,
            ..ProviderOptions::default()
        };
        assert!(
            oriented_bounding_box(&rectangle, &flat_header(), &Ellipsoid::WGS84, &options)
                .is_none()
        );
    }

    #[test]
    fn test_record_from_root_tiles() {
        let scheme = WebMercatorTilingScheme::default();
        let options = ProviderOptions::default();

        // Level one tiles span half the globe.
        let key = TileKey::new(0, 0, 1);
        let record = build_provider_record(
            &build_placeholder_tile(key, &scheme),
            key,
            &scheme,
            &options,
        );
        assert!(record.oriented_bounding_box.is_none());

        // Level two tiles span exactly a quarter turn, inside the threshold.
        let key = TileKey::new(1, 1, 2);
        let record = build_provider_record(
            &build_placeholder_tile(key, &scheme),
            key,
            &scheme,
            &options,
        );
        assert!(record.oriented_bounding_box.is_some());
    }

    #[test]
    fn test_record_fields() {
        let scheme = GeographicTilingScheme::default();
        let key = TileKey::new(5, 3, 3);
        let tile = build_placeholder_tile(key, &scheme);
        let options = ProviderOptions {
            credit: Some("Example terrain".to_owned()),
            ..ProviderOptions::default()
        };
        let record = build_provider_record(&tile, key, &scheme, &options);

        assert_eq!(record.skirt_heights, SkirtHeights::uniform(1.0));
        assert_eq!(record.child_tile_mask, 15);
        assert_eq!(record.credits, vec!["Example terrain".to_owned()]);
        assert_eq!(record.bounding_sphere, tile.header.bounding_sphere);
        assert_eq!(record.horizon_occlusion_point, tile.header.horizon_occlusion_point);
        assert_eq!(record.quantized_vertices(), tile.vertex_data());
        assert!(Arc::ptr_eq(&record.mesh, &tile.mesh));
        assert_eq!(record.minimum_height, 0.0);
    }

    #[test]
    fn test_level_zero_error_web_mercator() {
        let error = level_zero_geometric_error(&Ellipsoid::WGS84, 65, 1);
        let expected = 6_378_137.0 * TAU * 0.25 / 65.0;
        assert!((error - expected).abs() < 1e-6);
        // Roughly 154 km for a single root tile.
        assert!((error - 154_134.68).abs() < 0.01);
    }

    #[test]
    fn test_geometric_error_halves_exactly() {
        let level_zero = level_zero_geometric_error(&Ellipsoid::WGS84, 65, 2);
        for level in 0..30 {
            let error = geometric_error_at_level(level_zero, level);
            assert_eq!(geometric_error_at_level(level_zero, level + 1), error / 2.0);
        }
        assert_eq!(geometric_error_at_level(level_zero, 0), level_zero);
    }
}
