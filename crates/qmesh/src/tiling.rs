//! Tiling schemes: how `(x, y, level)` keys map onto the globe.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec2;

use crate::geodesy::{Cartographic, Ellipsoid, Rectangle};

/// Address of a tile in a quadtree pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub x: u32,
    pub y: u32,
    pub level: u32,
}

impl TileKey {
    #[must_use]
    pub fn new(x: u32, y: u32, level: u32) -> Self {
        Self { x, y, level }
    }

    /// Row index counted from the south edge, as TMS tile servers number rows.
    #[must_use]
    pub fn tms_row<S: TilingScheme + ?Sized>(&self, scheme: &S) -> u32 {
        scheme
            .number_of_y_tiles_at_level(self.level)
            .saturating_sub(self.y)
            .saturating_sub(1)
    }
}

impl std::fmt::Display for TileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.level, self.x, self.y)
    }
}

/// Mapping between tile keys and geographic extents.
///
/// Rows are numbered from the north edge.
pub trait TilingScheme: Send + Sync {
    fn ellipsoid(&self) -> &Ellipsoid;

    /// Geographic extent covered by the level-zero tiles.
    fn rectangle(&self) -> Rectangle;

    fn number_of_x_tiles_at_level(&self, level: u32) -> u32;

    fn number_of_y_tiles_at_level(&self, level: u32) -> u32;

    /// Geographic rectangle of a tile, in radians.
    fn tile_x_y_to_rectangle(&self, x: u32, y: u32, level: u32) -> Rectangle;

    /// Rectangle of a tile in the scheme's native projection units.
    fn tile_x_y_to_native_rectangle(&self, x: u32, y: u32, level: u32) -> Rectangle;
}

/// Tiles along one axis at `level`, saturating at `u32::MAX`.
fn tiles_at_level(level_zero: u32, level: u32) -> u32 {
    // `checked_shl` only rejects shifts of 64 or more; bits shifted out
    // below that are lost, so multiply instead.
    1u64.checked_shl(level)
        .and_then(|n| n.checked_mul(u64::from(level_zero)))
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(u32::MAX)
}

/// Equirectangular scheme with two root tiles. Native units are degrees.
#[derive(Debug, Clone)]
pub struct GeographicTilingScheme {
    ellipsoid: Ellipsoid,
}

impl Default for GeographicTilingScheme {
    fn default() -> Self {
        Self::new(Ellipsoid::WGS84)
    }
}

impl GeographicTilingScheme {
    #[must_use]
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }
}

impl TilingScheme for GeographicTilingScheme {
    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    fn rectangle(&self) -> Rectangle {
        Rectangle::MAX_VALUE
    }

    fn number_of_x_tiles_at_level(&self, level: u32) -> u32 {
        tiles_at_level(2, level)
    }

    fn number_of_y_tiles_at_level(&self, level: u32) -> u32 {
        tiles_at_level(1, level)
    }

    fn tile_x_y_to_rectangle(&self, x: u32, y: u32, level: u32) -> Rectangle {
        let bounds = self.rectangle();
        let tile_width = bounds.width() / f64::from(self.number_of_x_tiles_at_level(level));
        let tile_height = bounds.height() / f64::from(self.number_of_y_tiles_at_level(level));
        let (x, y) = (f64::from(x), f64::from(y));
        Rectangle::new(
            bounds.west + x * tile_width,
            bounds.north - (y + 1.0) * tile_height,
            bounds.west + (x + 1.0) * tile_width,
            bounds.north - y * tile_height,
        )
    }

    fn tile_x_y_to_native_rectangle(&self, x: u32, y: u32, level: u32) -> Rectangle {
        let r = self.tile_x_y_to_rectangle(x, y, level);
        Rectangle::new(
            r.west.to_degrees(),
            r.south.to_degrees(),
            r.east.to_degrees(),
            r.north.to_degrees(),
        )
    }
}

/// Spherical Web Mercator scheme with a single root tile. Native units are
/// metres on the ellipsoid's semi-major axis.
#[derive(Debug, Clone)]
pub struct WebMercatorTilingScheme {
    ellipsoid: Ellipsoid,
    semimajor_axis: f64,
}

impl Default for WebMercatorTilingScheme {
    fn default() -> Self {
        Self::new(Ellipsoid::WGS84)
    }
}

impl WebMercatorTilingScheme {
    /// Latitude at which the projection becomes square.
    pub const MAXIMUM_LATITUDE: f64 = 1.484_422_229_745_332_4;

    #[must_use]
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self {
            semimajor_axis: ellipsoid.maximum_radius(),
            ellipsoid,
        }
    }

    /// Project a geographic position into native coordinates.
    #[must_use]
    pub fn project(&self, position: Cartographic) -> DVec2 {
        let latitude = position
            .latitude
            .clamp(-Self::MAXIMUM_LATITUDE, Self::MAXIMUM_LATITUDE);
        let sin = latitude.sin();
        DVec2::new(
            position.longitude * self.semimajor_axis,
            0.5 * ((1.0 + sin) / (1.0 - sin)).ln() * self.semimajor_axis,
        )
    }

    #[must_use]
    pub fn unproject(&self, native: DVec2) -> Cartographic {
        let mercator_angle = native.y / self.semimajor_axis;
        Cartographic::new(
            native.x / self.semimajor_axis,
            FRAC_PI_2 - 2.0 * (-mercator_angle).exp().atan(),
            0.0,
        )
    }

    fn native_extent(&self) -> f64 {
        PI * self.semimajor_axis
    }
}

impl TilingScheme for WebMercatorTilingScheme {
    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    fn rectangle(&self) -> Rectangle {
        Rectangle::new(-PI, -Self::MAXIMUM_LATITUDE, PI, Self::MAXIMUM_LATITUDE)
    }

    fn number_of_x_tiles_at_level(&self, level: u32) -> u32 {
        tiles_at_level(1, level)
    }

    fn number_of_y_tiles_at_level(&self, level: u32) -> u32 {
        tiles_at_level(1, level)
    }

    fn tile_x_y_to_rectangle(&self, x: u32, y: u32, level: u32) -> Rectangle {
        let native = self.tile_x_y_to_native_rectangle(x, y, level);
        let south_west = self.unproject(DVec2::new(native.west, native.south));
        let north_east = self.unproject(DVec2::new(native.east, native.north));
        Rectangle::new(
            south_west.longitude,
            south_west.latitude,
            north_east.longitude,
            north_east.latitude,
        )
    }

    fn tile_x_y_to_native_rectangle(&self, x: u32, y: u32, level: u32) -> Rectangle {
        let extent = self.native_extent();
        let tile_width = 2.0 * extent / f64::from(self.number_of_x_tiles_at_level(level));
        let tile_height = 2.0 * extent / f64::from(self.number_of_y_tiles_at_level(level));
        let (x, y) = (f64::from(x), f64::from(y));
        Rectangle::new(
            -extent + x * tile_width,
            extent - (y + 1.0) * tile_height,
            -extent + (x + 1.0) * tile_width,
            extent - y * tile_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geographic_root_tiles() {
        let scheme = GeographicTilingScheme::default();
        assert_eq!(scheme.number_of_x_tiles_at_level(0), 2);
        assert_eq!(scheme.number_of_y_tiles_at_level(3), 8);

        let east = scheme.tile_x_y_to_rectangle(1, 0, 0);
        assert!((east.west - 0.0).abs() < 1e-12);
        assert!((east.east - PI).abs() < 1e-12);
        assert!((east.north - FRAC_PI_2).abs() < 1e-12);

        let native = scheme.tile_x_y_to_native_rectangle(1, 0, 0);
        assert!((native.east - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_web_mercator_root_covers_world() {
        let scheme = WebMercatorTilingScheme::default();
        let root = scheme.tile_x_y_to_rectangle(0, 0, 0);
        assert!((root.west + PI).abs() < 1e-12);
        assert!((root.east - PI).abs() < 1e-12);
        assert!((root.north - WebMercatorTilingScheme::MAXIMUM_LATITUDE).abs() < 1e-9);
        assert!((root.south + WebMercatorTilingScheme::MAXIMUM_LATITUDE).abs() < 1e-9);
    }

    #[test]
    fn test_web_mercator_projection_round_trip() {
        let scheme = WebMercatorTilingScheme::default();
        let position = Cartographic::from_degrees(-122.14, 42.80, 0.0);
        let back = scheme.unproject(scheme.project(position));
        assert!((back.longitude - position.longitude).abs() < 1e-12);
        assert!((back.latitude - position.latitude).abs() < 1e-12);
    }

    #[test]
    fn test_web_mercator_quadrants() {
        let scheme = WebMercatorTilingScheme::default();
        let north_west = scheme.tile_x_y_to_rectangle(0, 0, 1);
        assert!(north_west.south.abs() < 1e-12);
        assert!(north_west.east.abs() < 1e-12);
        assert!((north_west.width() - PI).abs() < 1e-12);

        let native = scheme.tile_x_y_to_native_rectangle(1, 1, 1);
        assert!(native.west.abs() < 1e-6);
        assert!(native.north.abs() < 1e-6);
    }

    #[test]
    fn test_tms_row_flips_y() {
        let scheme = WebMercatorTilingScheme::default();
        assert_eq!(TileKey::new(2618, 6339, 14).tms_row(&scheme), 10044);
        assert_eq!(TileKey::new(0, 0, 0).tms_row(&scheme), 0);
    }

    #[test]
    fn test_extreme_levels_do_not_overflow() {
        let scheme = GeographicTilingScheme::default();
        assert_eq!(scheme.number_of_x_tiles_at_level(40), u32::MAX);
        let r = scheme.tile_x_y_to_rectangle(u32::MAX, u32::MAX, 63);
        assert!(r.width().is_finite());
    }

    #[test]
    fn test_deep_levels_keep_tile_counts_nonzero() {
        let geographic = GeographicTilingScheme::default();
        let mercator = WebMercatorTilingScheme::default();
        for level in [32, 33, 62, 63, 64, 100, u32::MAX] {
            assert_eq!(geographic.number_of_x_tiles_at_level(level), u32::MAX);
            assert_eq!(mercator.number_of_y_tiles_at_level(level), u32::MAX);
            let r = geographic.tile_x_y_to_rectangle(0, 0, level);
            assert!(r.west.is_finite() && r.east.is_finite(), "level {level}: {r:?}");
            assert!(r.south.is_finite() && r.north.is_finite(), "level {level}: {r:?}");
        }
        assert_eq!(geographic.number_of_x_tiles_at_level(30), 1 << 31);
        assert_eq!(geographic.number_of_x_tiles_at_level(31), u32::MAX);
        assert_eq!(geographic.number_of_y_tiles_at_level(31), 1 << 31);
    }
}
