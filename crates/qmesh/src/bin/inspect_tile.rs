//! Decode a `.terrain` file and print a JSON summary.
//!
//! Run: `cargo run -p qmesh --features tools --bin inspect_tile -- <file.terrain> [max-step]`
//!
//! `max-step` is one of `header`, `vertices`, `triangleIndices`,
//! `edgeIndices` or `extensions` (the default).

use std::env;
use std::fs;

use qmesh::{DecodeOptions, DecodedTile, DecodingStep, Edge};
use qmesh_decode::{Extension, WaterMask, decode_with};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        eprintln!("Usage: inspect_tile <file.terrain> [max-step]");
        std::process::exit(2);
    };
    let max_decoding_step = match args.get(2) {
        Some(name) => DecodingStep::from_name(name).ok_or_else(|| {
            format!(
                "unknown step {name:?}, expected one of {}",
                DecodingStep::ALL.map(DecodingStep::name).join(", ")
            )
        })?,
        None => DecodingStep::default(),
    };

    let bytes = fs::read(path)?;
    tracing::info!(path, bytes = bytes.len(), "decoding");
    let tile = decode_with(&bytes, &DecodeOptions { max_decoding_step })?;

    println!("{}", serde_json::to_string_pretty(&summarize(&tile))?);
    Ok(())
}

fn summarize(tile: &DecodedTile) -> Value {
    let header = &tile.header;
    let edges: serde_json::Map<String, Value> = Edge::ALL
        .into_iter()
        .map(|edge| (edge.name().to_owned(), json!(tile.edges().get(edge).len())))
        .collect();
    let extensions: Vec<Value> = tile
        .mesh
        .extensions
        .iter()
        .map(|extension| match extension {
            Extension::OctVertexNormals(bytes) => json!({ "octVertexNormals": bytes.len() }),
            Extension::WaterMask(WaterMask::Uniform(value)) => {
                json!({ "waterMask": { "uniform": value } })
            }
            Extension::WaterMask(WaterMask::Grid(cells)) => {
                json!({ "waterMask": { "grid": cells.len() } })
            }
            Extension::Metadata(value) => json!({ "metadata": value }),
        })
        .collect();

    json!({
        "decodedThrough": tile.decoded_through.name(),
        "header": {
            "center": header.center.to_array(),
            "minimumHeight": header.minimum_height,
            "maximumHeight": header.maximum_height,
            "boundingSphere": {
                "center": header.bounding_sphere.center.to_array(),
                "radius": header.bounding_sphere.radius,
            },
            "horizonOcclusionPoint": header.horizon_occlusion_point.to_array(),
        },
        "vertexCount": tile.vertex_count(),
        "triangleCount": tile.triangle_indices().len() / 3,
        "indexWidthBytes": tile.triangle_indices().width().bytes(),
        "edges": edges,
        "extensions": extensions,
    })
}
