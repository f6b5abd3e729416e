//! Error types for tile decoding and encoding.

use thiserror::Error;

/// Result alias used throughout the decoder.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors raised while decoding a quantized-mesh tile.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("truncated {section}: needed {needed} bytes, {available} available")]
    Truncated {
        section: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("{section} declares {declared} bytes but only {available} remain")]
    SectionTooLong {
        section: &'static str,
        declared: usize,
        available: usize,
    },

    #[error("{section} index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        section: &'static str,
        index: u64,
        vertex_count: usize,
    },

    #[error("quantized {component} of vertex {vertex} is {value}, outside [0, 32767]")]
    QuantizedValueOutOfRange {
        component: &'static str,
        vertex: usize,
        value: i32,
    },

    #[error("invalid extension {id}: {reason}")]
    InvalidExtension { id: u8, reason: String },

    #[error("invalid metadata extension: {0}")]
    InvalidMetadata(#[from] serde_json::Error),
}

/// Errors raised by the reference encoder.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("triangle index {index} at position {position} skips ahead of high-water mark {highest}")]
    NotHighWaterMarkOrdered {
        position: usize,
        index: u32,
        highest: u32,
    },

    #[error("vertex data length {0} is not a multiple of 3")]
    RaggedVertexData(usize),

    #[error("{count} vertices exceed the 32-bit index range")]
    TooManyVertices { count: usize },
}
