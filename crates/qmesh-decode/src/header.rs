//! Fixed 88-byte tile header.

use glam::DVec3;

use crate::error::DecodeResult;
use crate::reader::Reader;

/// Size of the header on the wire.
pub const HEADER_SIZE: usize = 88;

/// Bounding sphere stored in the tile header, in Earth-centered fixed coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    #[must_use]
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Tile header.
///
/// # Format
///
/// - Bytes 0-23: Tile center (3 × f64)
/// - Bytes 24-31: Minimum and maximum height (2 × f32)
/// - Bytes 32-63: Bounding sphere center (3 × f64) and radius (f64)
/// - Bytes 64-87: Horizon occlusion point in ellipsoid-scaled space (3 × f64)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Header {
    pub center: DVec3,
    pub minimum_height: f32,
    pub maximum_height: f32,
    pub bounding_sphere: BoundingSphere,
    pub horizon_occlusion_point: DVec3,
}

pub(crate) fn read_header(reader: &mut Reader<'_>) -> DecodeResult<Header> {
    // Check the whole block up front so truncation reports the full header size.
    let mut block = Reader::new(reader.take(HEADER_SIZE, "header")?);
    let center = read_vec3(&mut block)?;
    let minimum_height = block.read_f32("header")?;
    let maximum_height = block.read_f32("header")?;
    let sphere_center = read_vec3(&mut block)?;
    let radius = block.read_f64("header")?;
    let horizon_occlusion_point = read_vec3(&mut block)?;

    Ok(Header {
        center,
        minimum_height,
        maximum_height,
        bounding_sphere: BoundingSphere::new(sphere_center, radius),
        horizon_occlusion_point,
    })
}

pub(crate) fn write_header(header: &Header, out: &mut Vec<u8>) {
    write_vec3(header.center, out);
    out.extend_from_slice(&header.minimum_height.to_le_bytes());
    out.extend_from_slice(&header.maximum_height.to_le_bytes());
    write_vec3(header.bounding_sphere.center, out);
    out.extend_from_slice(&header.bounding_sphere.radius.to_le_bytes());
    write_vec3(header.horizon_occlusion_point, out);
}

fn read_vec3(reader: &mut Reader<'_>) -> DecodeResult<DVec3> {
    Ok(DVec3::new(
        reader.read_f64("header")?,
        reader.read_f64("header")?,
        reader.read_f64("header")?,
    ))
}

fn write_vec3(v: DVec3, out: &mut Vec<u8>) {
    for c in v.to_array() {
        out.extend_from_slice(&c.to_le_bytes());
    }
}
