//! Error type for tile retrieval.

use qmesh_decode::DecodeError;
use thiserror::Error;

/// Errors from fetching or decoding a tile.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode tile: {0}")]
    Decode(#[from] DecodeError),
}
