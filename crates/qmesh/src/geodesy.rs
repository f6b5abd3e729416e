//! Ellipsoid and geographic rectangle math.

use std::f64::consts::{PI, TAU};

use glam::DVec3;

/// A geographic position in radians, with height in metres above the ellipsoid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Cartographic {
    #[must_use]
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }

    #[must_use]
    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        Self::new(longitude.to_radians(), latitude.to_radians(), height)
    }
}

/// Wrap an angle into `[-π, π]`.
#[must_use]
pub fn negative_pi_to_pi(angle: f64) -> f64 {
    if (-PI..=PI).contains(&angle) {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU);
    if wrapped.abs() < 1e-14 && angle > 0.0 {
        PI
    } else {
        wrapped - PI
    }
}

/// A geographic rectangle in radians.
///
/// `east < west` denotes a rectangle crossing the antimeridian.
/// Native (projected) rectangles reuse this type in projection units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rectangle {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Rectangle {
    /// The whole globe.
    pub const MAX_VALUE: Rectangle = Rectangle {
        west: -PI,
        south: -PI / 2.0,
        east: PI,
        north: PI / 2.0,
    };

    #[must_use]
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    #[must_use]
    pub fn from_degrees(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self::new(
            west.to_radians(),
            south.to_radians(),
            east.to_radians(),
            north.to_radians(),
        )
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        let east = if self.east < self.west {
            self.east + TAU
        } else {
            self.east
        };
        east - self.west
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    #[must_use]
    pub fn center(&self) -> Cartographic {
        let east = if self.east < self.west {
            self.east + TAU
        } else {
            self.east
        };
        Cartographic::new(
            negative_pi_to_pi((self.west + east) * 0.5),
            (self.south + self.north) * 0.5,
            0.0,
        )
    }
}

/// A triaxial ellipsoid centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub radii: DVec3,
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        radii: DVec3::new(6_378_137.0, 6_378_137.0, 6_356_752.314_245_179),
    };

    #[must_use]
    pub fn new(radii: DVec3) -> Self {
        Self { radii }
    }

    #[must_use]
    pub fn maximum_radius(&self) -> f64 {
        self.radii.max_element()
    }

    fn radii_squared(&self) -> DVec3 {
        self.radii * self.radii
    }

    /// Unit normal of the surface at a geographic position.
    #[must_use]
    pub fn geodetic_surface_normal_cartographic(&self, position: Cartographic) -> DVec3 {
        let (sin_lon, cos_lon) = position.longitude.sin_cos();
        let (sin_lat, cos_lat) = position.latitude.sin_cos();
        DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat).normalize()
    }

    /// Unit normal of the surface passing through `position`.
    #[must_use]
    pub fn geodetic_surface_normal(&self, position: DVec3) -> DVec3 {
        (position / self.radii_squared()).normalize()
    }

    #[must_use]
    pub fn cartographic_to_cartesian(&self, position: Cartographic) -> DVec3 {
        let n = self.geodetic_surface_normal_cartographic(position);
        let k = self.radii_squared() * n;
        let gamma = n.dot(k).sqrt();
        k / gamma + n * position.height
    }

    /// Scale a position so the ellipsoid becomes a unit sphere, the space
    /// horizon occlusion points are expressed in.
    #[must_use]
    pub fn transform_position_to_scaled_space(&self, position: DVec3) -> DVec3 {
        position / self.radii
    }
}
