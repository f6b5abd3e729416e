//! Index unpacking.

use crate::error::{DecodeError, DecodeResult, EncodeError};
use crate::reader::Reader;

/// Largest vertex count that still uses 16-bit indices.
pub const MAX_U16_VERTEX_COUNT: usize = 65536;

/// Element width of every index array in a tile.
///
/// Chosen by the encoder from the vertex count and resolved once per decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    #[must_use]
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count > MAX_U16_VERTEX_COUNT {
            Self::U32
        } else {
            Self::U16
        }
    }

    /// Size of one index in bytes.
    #[must_use]
    pub fn bytes(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// An index array stored at the width the tile was encoded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Default for Indices {
    fn default() -> Self {
        Self::U16(Vec::new())
    }
}

impl Indices {
    /// Create an empty array of the given width.
    #[must_use]
    pub fn empty(width: IndexWidth) -> Self {
        Self::with_capacity(width, 0)
    }

    fn with_capacity(width: IndexWidth, capacity: usize) -> Self {
        match width {
            IndexWidth::U16 => Self::U16(Vec::with_capacity(capacity)),
            IndexWidth::U32 => Self::U32(Vec::with_capacity(capacity)),
        }
    }

    #[must_use]
    pub fn width(&self) -> IndexWidth {
        match self {
            Self::U16(_) => IndexWidth::U16,
            Self::U32(_) => IndexWidth::U32,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            Self::U16(v) => v.get(i).map(|&x| u32::from(x)),
            Self::U32(v) => v.get(i).copied(),
        }
    }

    /// Iterate over the indices widened to `u32`.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }

    #[must_use]
    pub fn to_u32_vec(&self) -> Vec<u32> {
        match self {
            Self::U16(v) => v.iter().map(|&x| u32::from(x)).collect(),
            Self::U32(v) => v.clone(),
        }
    }

    /// Push an index that the caller has already range checked for this width.
    fn push(&mut self, index: u32) {
        match self {
            #[allow(clippy::cast_possible_truncation)]
            Self::U16(v) => v.push(index as u16),
            Self::U32(v) => v.push(index),
        }
    }
}

/// Tile edges, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    West,
    South,
    East,
    North,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::West, Edge::South, Edge::East, Edge::North];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Edge::West => "west",
            Edge::South => "south",
            Edge::East => "east",
            Edge::North => "north",
        }
    }

    fn section(self) -> &'static str {
        match self {
            Edge::West => "west indices",
            Edge::South => "south indices",
            Edge::East => "east indices",
            Edge::North => "north indices",
        }
    }
}

/// Vertices lying on each tile edge. Corners appear in two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeIndices {
    pub west: Indices,
    pub south: Indices,
    pub east: Indices,
    pub north: Indices,
}

impl EdgeIndices {
    #[must_use]
    pub fn get(&self, edge: Edge) -> &Indices {
        match edge {
            Edge::West => &self.west,
            Edge::South => &self.south,
            Edge::East => &self.east,
            Edge::North => &self.north,
        }
    }

    fn get_mut(&mut self, edge: Edge) -> &mut Indices {
        match edge {
            Edge::West => &mut self.west,
            Edge::South => &mut self.south,
            Edge::East => &mut self.east,
            Edge::North => &mut self.north,
        }
    }
}

fn read_index(reader: &mut Reader<'_>, width: IndexWidth, section: &'static str) -> DecodeResult<u32> {
    match width {
        IndexWidth::U16 => reader.read_u16(section).map(u32::from),
        IndexWidth::U32 => reader.read_u32(section),
    }
}

fn check_index(index: u64, vertex_count: usize, section: &'static str) -> DecodeResult<u32> {
    u32::try_from(index)
        .ok()
        .filter(|&i| (i as usize) < vertex_count)
        .ok_or(DecodeError::IndexOutOfRange {
            section,
            index,
            vertex_count,
        })
}

/// Unpack high-water-mark encoded triangle indices.
///
/// Each code is the distance below the highest index seen so far; a code of
/// zero introduces a new vertex and raises the mark by one.
pub(crate) fn unpack_triangle_indices(
    reader: &mut Reader<'_>,
    width: IndexWidth,
    vertex_count: usize,
) -> DecodeResult<Indices> {
    const SECTION: &str = "triangle indices";

    reader.align(width.bytes(), SECTION)?;
    let triangle_count = reader.read_count(3 * width.bytes(), SECTION)?;
    let mut indices = Indices::with_capacity(width, triangle_count * 3);

    let mut highest = 0u64;
    for _ in 0..triangle_count * 3 {
        let code = u64::from(read_index(reader, width, SECTION)?);
        // A code above the mark would reference a negative index.
        let index = highest.checked_sub(code).ok_or(DecodeError::IndexOutOfRange {
            section: SECTION,
            index: code,
            vertex_count,
        })?;
        indices.push(check_index(index, vertex_count, SECTION)?);
        if code == 0 {
            highest += 1;
        }
    }

    Ok(indices)
}

/// Unpack the four edge index lists, each a `u32` count followed by plain indices.
pub(crate) fn unpack_edge_indices(
    reader: &mut Reader<'_>,
    width: IndexWidth,
    vertex_count: usize,
) -> DecodeResult<EdgeIndices> {
    let mut edges = EdgeIndices {
        west: Indices::empty(width),
        south: Indices::empty(width),
        east: Indices::empty(width),
        north: Indices::empty(width),
    };

    for edge in Edge::ALL {
        let section = edge.section();
        let count = reader.read_count(width.bytes(), section)?;
        let list = edges.get_mut(edge);
        for _ in 0..count {
            let index = read_index(reader, width, section)?;
            list.push(check_index(u64::from(index), vertex_count, section)?);
        }
    }

    Ok(edges)
}

fn write_index(index: u32, width: IndexWidth, out: &mut Vec<u8>) {
    match width {
        #[allow(clippy::cast_possible_truncation)]
        IndexWidth::U16 => out.extend_from_slice(&(index as u16).to_le_bytes()),
        IndexWidth::U32 => out.extend_from_slice(&index.to_le_bytes()),
    }
}

fn write_len(len: usize, out: &mut Vec<u8>) {
    #[allow(clippy::cast_possible_truncation)]
    let len = len as u32;
    out.extend_from_slice(&len.to_le_bytes());
}

/// Inverse of [`unpack_triangle_indices`].
pub(crate) fn pack_triangle_indices(
    indices: &Indices,
    width: IndexWidth,
    out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    while out.len() % width.bytes() != 0 {
        out.push(0);
    }
    write_len(indices.len() / 3, out);

    let mut highest = 0u32;
    for (position, index) in indices.iter().enumerate() {
        if index > highest {
            return Err(EncodeError::NotHighWaterMarkOrdered {
                position,
                index,
                highest,
            });
        }
        let code = highest - index;
        write_index(code, width, out);
        if code == 0 {
            highest += 1;
        }
    }
    Ok(())
}

/// Inverse of [`unpack_edge_indices`].
pub(crate) fn pack_edge_indices(edges: &EdgeIndices, width: IndexWidth, out: &mut Vec<u8>) {
    for edge in Edge::ALL {
        let list = edges.get(edge);
        write_len(list.len(), out);
        for index in list.iter() {
            write_index(index, width, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_codes(count: u32, codes: &[u16]) -> Vec<u8> {
        let mut out = count.to_le_bytes().to_vec();
        for code in codes {
            out.extend_from_slice(&code.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_index_width_threshold() {
        assert_eq!(IndexWidth::for_vertex_count(4), IndexWidth::U16);
        assert_eq!(IndexWidth::for_vertex_count(65536), IndexWidth::U16);
        assert_eq!(IndexWidth::for_vertex_count(65537), IndexWidth::U32);
        assert_eq!(IndexWidth::U32.bytes(), 4);
    }

    #[test]
    fn test_high_water_mark_decoding() {
        // Two triangles of a quad: [0, 1, 2] and [0, 2, 3].
        let data = u16_codes(2, &[0, 0, 0, 3, 1, 0]);
        let indices = unpack_triangle_indices(&mut Reader::new(&data), IndexWidth::U16, 4).unwrap();
        assert_eq!(indices.to_u32_vec(), vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_code_above_mark_is_rejected() {
        let data = u16_codes(1, &[0, 5, 0]);
        let err = unpack_triangle_indices(&mut Reader::new(&data), IndexWidth::U16, 8).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::IndexOutOfRange {
                section: "triangle indices",
                index: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_index_beyond_vertex_count_is_rejected() {
        // Codes of zero walk the mark up to 3 while only 2 vertices exist.
        let data = u16_codes(1, &[0, 0, 0]);
        let err = unpack_triangle_indices(&mut Reader::new(&data), IndexWidth::U16, 2).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::IndexOutOfRange {
                index: 2,
                vertex_count: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_u32_indices_are_aligned() {
        // Reader sits at offset 2; two padding bytes precede the count.
        let mut data = vec![0xAA, 0xBB, 0, 0];
        data.extend_from_slice(&1u32.to_le_bytes());
        for code in [0u32, 0, 0] {
            data.extend_from_slice(&code.to_le_bytes());
        }
        let mut reader = Reader::new(&data);
        reader.take(2, "test").unwrap();
        let indices = unpack_triangle_indices(&mut reader, IndexWidth::U32, 70_000).unwrap();
        assert_eq!(indices, Indices::U32(vec![0, 1, 2]));
    }

    #[test]
    fn test_edge_lists_are_plain() {
        let mut data = Vec::new();
        for list in [&[0u16, 3][..], &[0, 1], &[1, 2], &[3, 2]] {
            data.extend_from_slice(&u16_codes(u32::try_from(list.len()).unwrap(), list));
        }
        let edges = unpack_edge_indices(&mut Reader::new(&data), IndexWidth::U16, 4).unwrap();
        assert_eq!(edges.west.to_u32_vec(), vec![0, 3]);
        assert_eq!(edges.get(Edge::North).to_u32_vec(), vec![3, 2]);
    }

    #[test]
    fn test_edge_index_out_of_range() {
        let mut data = u16_codes(1, &[9]);
        data.extend_from_slice(&[0; 12]);
        let err = unpack_edge_indices(&mut Reader::new(&data), IndexWidth::U16, 4).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::IndexOutOfRange {
                section: "west indices",
                index: 9,
                ..
            }
        ));
    }

    #[test]
    fn test_encoder_rejects_unordered_indices() {
        let mut out = Vec::new();
        let err = pack_triangle_indices(&Indices::U16(vec![1, 0, 2]), IndexWidth::U16, &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::NotHighWaterMarkOrdered {
                position: 0,
                index: 1,
                highest: 0
            }
        ));
    }
}
