//! Vertex unpacking.

use crate::error::{DecodeError, DecodeResult};
use crate::reader::Reader;

/// Largest quantized coordinate value.
pub const MAX_QUANTIZED: u16 = 32767;

/// Names of the three coordinate streams, in wire order.
const COMPONENTS: [&str; 3] = ["u", "v", "height"];

/// Decode one zig-zag encoded value.
#[must_use]
pub fn zigzag_decode(value: u16) -> i32 {
    i32::from(value >> 1) ^ -i32::from(value & 1)
}

/// Zig-zag encode a signed delta.
///
/// Deltas between quantized values always fit in `[-32767, 32767]`, so the
/// result fits in 16 bits.
#[must_use]
pub fn zigzag_encode(value: i32) -> u16 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let encoded = ((value << 1) ^ (value >> 31)) as u16;
    encoded
}

/// Unpack delta-encoded vertex positions.
///
/// Input format: `u32` vertex count followed by three `u16` arrays
/// [U0..Un, V0..Vn, H0..Hn]. Each value is the zig-zag encoded delta from
/// the previous value of the same component.
///
/// Output: the absolute quantized values in the same [U..., V..., H...] layout.
pub(crate) fn unpack_vertices(reader: &mut Reader<'_>) -> DecodeResult<Vec<u16>> {
    let vertex_count = reader.read_count(6, "vertex data")?;
    let mut vertex_data = Vec::with_capacity(vertex_count * 3);

    for component in COMPONENTS {
        let mut value = 0i32;
        for vertex in 0..vertex_count {
            value += zigzag_decode(reader.read_u16("vertex data")?);
            let quantized = u16::try_from(value)
                .ok()
                .filter(|q| *q <= MAX_QUANTIZED)
                .ok_or(DecodeError::QuantizedValueOutOfRange {
                    component,
                    vertex,
                    value,
                })?;
            vertex_data.push(quantized);
        }
    }

    Ok(vertex_data)
}

/// Inverse of [`unpack_vertices`].
pub(crate) fn pack_vertices(vertex_data: &[u16], out: &mut Vec<u8>) {
    let vertex_count = vertex_data.len() / 3;
    #[allow(clippy::cast_possible_truncation)]
    let count = vertex_count as u32;
    out.extend_from_slice(&count.to_le_bytes());

    for stream in vertex_data.chunks_exact(vertex_count.max(1)) {
        let mut previous = 0i32;
        for &value in stream {
            let value = i32::from(value);
            out.extend_from_slice(&zigzag_encode(value - previous).to_le_bytes());
            previous = value;
        }
    }
}
