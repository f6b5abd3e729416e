//! Fetch one tile through the terrain provider and print its record.
//!
//! Run: `cargo run -p qmesh --features tools --bin fetch_tile -- <template> <x> <y> <level> [geographic]`
//!
//! The template takes `{z}`, `{x}`, `{y}` and `{reverseY}` placeholders.
//! Failed tiles come back as placeholders, so set `RUST_LOG=qmesh=debug`
//! to see why.

use std::env;

use qmesh::{
    GeographicTilingScheme, NoCache, ProviderOptions, ProviderRecord, TerrainProvider, TileKey,
    TilingScheme, UrlTemplate, WebMercatorTilingScheme, placeholder_mesh,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("qmesh=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 5 {
        eprintln!("Usage: fetch_tile <template> <x> <y> <level> [geographic]");
        std::process::exit(2);
    }
    let template = UrlTemplate::new(args[1].as_str());
    let key = TileKey::new(args[2].parse()?, args[3].parse()?, args[4].parse()?);
    let options = ProviderOptions::default();

    let record = if args.get(5).is_some_and(|s| s == "geographic") {
        fetch(GeographicTilingScheme::default(), template, options, key).await
    } else {
        fetch(WebMercatorTilingScheme::default(), template, options, key).await
    };
    println!("{record}");
    Ok(())
}

async fn fetch<S: TilingScheme + 'static>(
    scheme: S,
    template: UrlTemplate,
    options: ProviderOptions,
    key: TileKey,
) -> String {
    let provider = TerrainProvider::new(scheme, template, options, NoCache);
    tracing::info!(%key, url = %provider.client().tile_url(key), "requesting");
    let record = provider.request_tile_geometry(key).await;
    let error = provider.level_maximum_geometric_error(key.level);
    serde_json::to_string_pretty(&summarize(&record, error)).unwrap_or_default()
}

fn summarize(record: &ProviderRecord, geometric_error: f64) -> serde_json::Value {
    json!({
        "key": record.key.to_string(),
        "placeholder": std::sync::Arc::ptr_eq(&record.mesh, &placeholder_mesh()),
        "minimumHeight": record.minimum_height,
        "maximumHeight": record.maximum_height,
        "vertexCount": record.mesh.vertex_count(),
        "triangleCount": record.mesh.triangle_indices.len() / 3,
        "boundingSphere": {
            "center": record.bounding_sphere.center.to_array(),
            "radius": record.bounding_sphere.radius,
        },
        "orientedBoundingBox": record.oriented_bounding_box.map(|obb| json!({
            "center": obb.center.to_array(),
            "halfAxes": obb.half_axes.to_cols_array(),
        })),
        "horizonOcclusionPoint": record.horizon_occlusion_point.to_array(),
        "skirtHeight": record.skirt_heights.west,
        "childTileMask": record.child_tile_mask,
        "credits": record.credits,
        "levelMaximumGeometricError": geometric_error,
    })
}
