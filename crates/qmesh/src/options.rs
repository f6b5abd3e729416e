//! Provider configuration.

use std::f64::consts::FRAC_PI_2;

use serde::Deserialize;

use crate::tiling::{TileKey, TilingScheme};

/// Skirt height applied to every edge, in metres.
///
/// Large enough to close the small cracks between neighbouring tiles that
/// are loaded at different levels.
pub const DEFAULT_SKIRT_HEIGHT: f64 = 1.0;

/// Widest tile rectangle, in radians, that still gets an oriented bounding
/// box. Box fitting becomes numerically unstable past a quarter turn.
pub const OBB_MAX_RECTANGLE_WIDTH: f64 = FRAC_PI_2 + 1e-5;

/// Heightmap sample width the level-zero geometric error is estimated against.
pub const HEIGHTMAP_REFERENCE_WIDTH: u32 = 65;

/// Tuning knobs for provider records.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderOptions {
    /// Skirt height for all four edges.
    pub skirt_height: f64,
    /// Tiles wider than this get no oriented bounding box.
    pub obb_max_rectangle_width: f64,
    /// Reference heightmap width for geometric error estimation.
    pub heightmap_width: u32,
    /// Attribution attached to every record.
    pub credit: Option<String>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            skirt_height: DEFAULT_SKIRT_HEIGHT,
            obb_max_rectangle_width: OBB_MAX_RECTANGLE_WIDTH,
            heightmap_width: HEIGHTMAP_REFERENCE_WIDTH,
            credit: None,
        }
    }
}

/// Tile URL pattern with `{z}`, `{x}`, `{y}` and `{reverseY}` placeholders.
///
/// `{reverseY}` is the row counted from the south, for TMS layouts such as
/// `/tiles/{z}/{x}/{reverseY}.terrain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn expand<S: TilingScheme + ?Sized>(&self, key: TileKey, scheme: &S) -> String {
        self.0
            .replace("{z}", &key.level.to_string())
            .replace("{x}", &key.x.to_string())
            .replace("{reverseY}", &key.tms_row(scheme).to_string())
            .replace("{y}", &key.y.to_string())
    }
}
