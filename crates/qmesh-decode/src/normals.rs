//! Octahedron-encoded normal unpacking.

use glam::{Vec2, Vec3};

/// Rescale an encoded byte from `[0, 255]` to `[-1, 1]`.
fn unpack_component(value: u8) -> f32 {
    f32::from(value) / 255.0 * 2.0 - 1.0
}

fn sign_not_zero(v: Vec2) -> Vec2 {
    Vec2::new(
        if v.x >= 0.0 { 1.0 } else { -1.0 },
        if v.y >= 0.0 { 1.0 } else { -1.0 },
    )
}

/// Decode one oct-encoded normal.
///
/// The two bytes locate a point on the unfolded octahedron. Points outside
/// the central diamond (`z < 0`) belong to the lower hemisphere and are
/// folded back, keeping the sign of each axis with magnitude `1 - (|x| + |y|)`.
#[must_use]
pub fn decode_oct(x: u8, y: u8) -> Vec3 {
    let mut xy = Vec2::new(unpack_component(x), unpack_component(y));
    let l1 = xy.x.abs() + xy.y.abs();
    let z = 1.0 - l1;

    if z < 0.0 {
        xy = sign_not_zero(xy) * (1.0 - l1);
    }

    xy.extend(z).normalize()
}

/// Decode a packed normal buffer, two bytes per vertex.
#[must_use]
pub fn decode_oct_normals(packed: &[u8]) -> Vec<Vec3> {
    packed
        .chunks_exact(2)
        .map(|pair| decode_oct(pair[0], pair[1]))
        .collect()
}
