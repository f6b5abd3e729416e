//! Oriented bounding boxes fitted to geographic rectangles.

use std::f64::consts::PI;

use glam::{DMat3, DVec2, DVec3};

use crate::geodesy::{Cartographic, Ellipsoid, Rectangle};

/// Oriented bounding box for culling.
///
/// Each column of `half_axes` is one axis of the box scaled to half its
/// length along that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBoundingBox {
    pub center: DVec3,
    pub half_axes: DMat3,
}

impl OrientedBoundingBox {
    /// Fit a box around the part of the ellipsoid surface covered by
    /// `rectangle`, between two heights.
    ///
    /// The box is aligned with the tangent plane at the rectangle's center.
    /// Rectangles wider or taller than π have no well-defined tangent-plane
    /// fit and return `None`.
    #[must_use]
    pub fn from_rectangle(
        rectangle: &Rectangle,
        minimum_height: f64,
        maximum_height: f64,
        ellipsoid: &Ellipsoid,
    ) -> Option<Self> {
        let (width, height) = (rectangle.width(), rectangle.height());
        if !(0.0..=PI).contains(&width) || !(0.0..=PI).contains(&height) {
            return None;
        }

        let center = rectangle.center();
        let plane = TangentPlane::new(ellipsoid.cartographic_to_cartesian(center), ellipsoid);

        let lon_center = center.longitude;
        let lat_center = if rectangle.south < 0.0 && rectangle.north > 0.0 {
            0.0
        } else {
            center.latitude
        };

        let at = |longitude, latitude, height| {
            ellipsoid.cartographic_to_cartesian(Cartographic::new(longitude, latitude, height))
        };
        let project = |longitude, latitude| plane.project_point(at(longitude, latitude, maximum_height));

        // XY extents from the perimeter at maximum height.
        let nw = project(rectangle.west, rectangle.north)?;
        let nc = project(lon_center, rectangle.north)?;
        let ne = project(rectangle.east, rectangle.north)?;
        let cw = project(rectangle.west, lat_center)?;
        let sw = project(rectangle.west, rectangle.south)?;
        let sc = project(lon_center, rectangle.south)?;
        let se = project(rectangle.east, rectangle.south)?;

        let min_x = nw.x.min(cw.x).min(sw.x);
        let max_x = -min_x;
        let max_y = nw.y.max(nc.y).max(ne.y);
        let min_y = sw.y.min(sc.y).min(se.y);

        // The surface curves away from the plane, so the lowest point is at a
        // western corner at minimum height.
        let min_z = plane
            .distance(at(rectangle.west, rectangle.north, minimum_height))
            .min(plane.distance(at(rectangle.west, rectangle.south, minimum_height)));
        let max_z = maximum_height;

        Some(Self::from_plane_extents(
            &plane,
            DVec3::new(min_x, min_y, min_z),
            DVec3::new(max_x, max_y, max_z),
        ))
    }

    fn from_plane_extents(plane: &TangentPlane, min: DVec3, max: DVec3) -> Self {
        let axes = DMat3::from_cols(plane.x_axis, plane.y_axis, plane.z_axis);
        let scale = (max - min) * 0.5;
        Self {
            center: plane.origin + axes * ((min + max) * 0.5),
            half_axes: DMat3::from_cols(
                plane.x_axis * scale.x,
                plane.y_axis * scale.y,
                plane.z_axis * scale.z,
            ),
        }
    }

    /// Whether `point` lies inside the box, with a relative tolerance per axis.
    ///
    /// Degenerate (zero-length) axes are not checked.
    #[must_use]
    pub fn contains(&self, point: DVec3, tolerance: f64) -> bool {
        let offset = point - self.center;
        (0..3).all(|i| {
            let axis = self.half_axes.col(i);
            let length_squared = axis.length_squared();
            length_squared == 0.0 || (offset.dot(axis) / length_squared).abs() <= 1.0 + tolerance
        })
    }
}

/// Plane tangent to the ellipsoid, with an east-north-up frame at its origin.
struct TangentPlane {
    origin: DVec3,
    x_axis: DVec3,
    y_axis: DVec3,
    z_axis: DVec3,
    distance: f64,
}

impl TangentPlane {
    fn new(origin: DVec3, ellipsoid: &Ellipsoid) -> Self {
        let (east, north, up) = east_north_up(origin, ellipsoid);
        Self {
            origin,
            x_axis: east,
            y_axis: north,
            z_axis: up,
            distance: -up.dot(origin),
        }
    }

    /// Signed distance of `point` above the plane.
    fn distance(&self, point: DVec3) -> f64 {
        self.z_axis.dot(point) + self.distance
    }

    /// Project along the ray through the ellipsoid center, returning
    /// coordinates in the plane's east/north frame.
    fn project_point(&self, point: DVec3) -> Option<DVec2> {
        let direction = point.normalize();
        let hit = self
            .intersect_ray(point, direction)
            .or_else(|| self.intersect_ray(point, -direction))?;
        let v = hit - self.origin;
        Some(DVec2::new(self.x_axis.dot(v), self.y_axis.dot(v)))
    }

    fn intersect_ray(&self, origin: DVec3, direction: DVec3) -> Option<DVec3> {
        let denominator = self.z_axis.dot(direction);
        if denominator.abs() < 1e-15 {
            return None;
        }
        let t = (-self.distance - self.z_axis.dot(origin)) / denominator;
        (t >= 0.0).then(|| origin + direction * t)
    }
}

/// Local east, north and up unit vectors at a position on the ellipsoid.
fn east_north_up(origin: DVec3, ellipsoid: &Ellipsoid) -> (DVec3, DVec3, DVec3) {
    if origin.x.abs() < 1e-14 && origin.y.abs() < 1e-14 {
        // On the polar axis east is arbitrary; pick +Y.
        let up = DVec3::new(0.0, 0.0, origin.z.signum());
        let east = DVec3::Y;
        return (east, up.cross(east), up);
    }
    let up = ellipsoid.geodetic_surface_normal(origin);
    let east = DVec3::new(-origin.y, origin.x, 0.0).normalize();
    (east, up.cross(east), up)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners(rectangle: &Rectangle, height: f64) -> Vec<DVec3> {
        let e = Ellipsoid::WGS84;
        [
            (rectangle.west, rectangle.north),
            (rectangle.east, rectangle.north),
            (rectangle.west, rectangle.south),
            (rectangle.east, rectangle.south),
        ]
        .into_iter()
        .map(|(lon, lat)| e.cartographic_to_cartesian(Cartographic::new(lon, lat, height)))
        .collect()
    }

    #[test]
    fn test_small_rectangle_contains_corners() {
        let rectangle = Rectangle::from_degrees(-122.2, 42.7, -122.1, 42.8);
        let obb =
            OrientedBoundingBox::from_rectangle(&rectangle, 1200.0, 2800.0, &Ellipsoid::WGS84)
                .unwrap();
        for corner in corners(&rectangle, 1200.0)
            .into_iter()
            .chain(corners(&rectangle, 2800.0))
        {
            // Corners above the tangent plane sit a few parts in 10^4 past
            // the radially projected extents.
            assert!(obb.contains(corner, 1e-3), "corner {corner} outside box");
        }
        assert!(!obb.contains(obb.center + obb.half_axes.col(2) * 3.0, 1e-6));
    }

    #[test]
    fn test_box_is_upright_at_center() {
        let rectangle = Rectangle::from_degrees(10.0, 40.0, 11.0, 41.0);
        let e = Ellipsoid::WGS84;
        let obb = OrientedBoundingBox::from_rectangle(&rectangle, 0.0, 100.0, &e).unwrap();
        let up = e.geodetic_surface_normal_cartographic(rectangle.center());
        assert!(obb.half_axes.col(2).normalize().abs_diff_eq(up, 1e-9));
        // Height span of 100 m plus the curvature sag gives a z half-axis above 50 m.
        assert!(obb.half_axes.col(2).length() > 50.0);
    }

    #[test]
    fn test_equator_spanning_rectangle() {
        let rectangle = Rectangle::from_degrees(0.0, -45.0, 90.0, 45.0);
        let obb =
            OrientedBoundingBox::from_rectangle(&rectangle, 0.0, 0.0, &Ellipsoid::WGS84).unwrap();
        for corner in corners(&rectangle, 0.0) {
            assert!(obb.contains(corner, 1e-3));
        }
    }

    #[test]
    fn test_rectangle_wider_than_pi_is_rejected() {
        let rectangle = Rectangle::from_degrees(-100.0, 0.0, 100.0, 10.0);
        assert!(
            OrientedBoundingBox::from_rectangle(&rectangle, 0.0, 0.0, &Ellipsoid::WGS84).is_none()
        );
    }

    #[test]
    fn test_polar_frame_is_orthonormal() {
        let (east, north, up) =
            east_north_up(DVec3::new(0.0, 0.0, 6_356_752.0), &Ellipsoid::WGS84);
        assert!(east.dot(north).abs() < 1e-12);
        assert!((north.cross(up) - east).length() < 1e-12);
        assert_eq!(up, DVec3::Z);
    }
}
