//! Terrain provider: fetch, fall back, and wrap tiles into records.

use std::sync::Arc;

use qmesh_decode::DecodedTile;

use crate::cache::Cache;
use crate::client::Client;
use crate::error::Error;
use crate::options::{ProviderOptions, UrlTemplate};
use crate::placeholder::build_placeholder_tile;
use crate::record::{
    ProviderRecord, build_provider_record, geometric_error_at_level, level_zero_geometric_error,
};
use crate::tiling::{TileKey, TilingScheme};

/// Serves provider records for a tile server.
///
/// A failed fetch or decode never surfaces to the caller: the tile is
/// replaced by a flat placeholder and the failure is logged.
pub struct TerrainProvider<S, C> {
    scheme: Arc<S>,
    client: Client<C>,
    options: ProviderOptions,
    level_zero_error: f64,
}

impl<S: TilingScheme + 'static, C: Cache> TerrainProvider<S, C> {
    /// Create a provider fetching from a URL template.
    pub fn new(scheme: S, template: UrlTemplate, options: ProviderOptions, cache: C) -> Self {
        let scheme = Arc::new(scheme);
        let client = Client::from_template(template, Arc::clone(&scheme), cache);
        Self::with_client(scheme, client, options)
    }

    pub fn with_client(scheme: Arc<S>, client: Client<C>, options: ProviderOptions) -> Self {
        let level_zero_error = level_zero_geometric_error(
            scheme.ellipsoid(),
            options.heightmap_width,
            scheme.number_of_x_tiles_at_level(0),
        );
        Self {
            scheme,
            client,
            options,
            level_zero_error,
        }
    }

    pub fn tiling_scheme(&self) -> &S {
        &self.scheme
    }

    pub fn client(&self) -> &Client<C> {
        &self.client
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Fetch a tile and build its record, substituting a placeholder on failure.
    pub async fn request_tile_geometry(&self, key: TileKey) -> ProviderRecord {
        let result = self.client.fetch_tile(key).await;
        let tile = self.resolve_tile(key, result);
        build_provider_record(&tile, key, self.scheme.as_ref(), &self.options)
    }

    /// Every tile is assumed to exist.
    pub fn tile_data_available(&self, _key: TileKey) -> bool {
        true
    }

    pub fn level_maximum_geometric_error(&self, level: u32) -> f64 {
        geometric_error_at_level(self.level_zero_error, level)
    }

    /// Keep a fetched tile, or replace a failed one with a placeholder.
    pub fn resolve_tile(&self, key: TileKey, result: Result<DecodedTile, Error>) -> DecodedTile {
        match result {
            Ok(tile) => tile,
            Err(err) => {
                tracing::warn!(
                    %key,
                    url = %self.client.tile_url(key),
                    error = %err,
                    "tile unavailable, using placeholder"
                );
                build_placeholder_tile(key, self.scheme.as_ref())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::client::tests::square_tile_bytes;
    use crate::placeholder::placeholder_mesh;
    use crate::tiling::{GeographicTilingScheme, WebMercatorTilingScheme};

    fn provider() -> TerrainProvider<WebMercatorTilingScheme, MemoryCache> {
        TerrainProvider::new(
            WebMercatorTilingScheme::default(),
            UrlTemplate::new("mem://{z}/{x}/{reverseY}.terrain"),
            ProviderOptions::default(),
            MemoryCache::new(),
        )
    }

    #[test]
    fn test_resolve_keeps_good_tiles() {
        let provider = provider();
        let key = TileKey::new(0, 0, 0);
        let tile = qmesh_decode::decode(&square_tile_bytes()).unwrap();
        let resolved = provider.resolve_tile(key, Ok(tile.clone()));
        assert_eq!(resolved, tile);
    }

    #[test]
    fn test_resolve_substitutes_placeholder() {
        let provider = provider();
        let key = TileKey::new(1, 1, 2);
        let resolved = provider.resolve_tile(
            key,
            Err(Error::Status {
                url: provider.client().tile_url(key),
                status: 404,
            }),
        );
        assert!(Arc::ptr_eq(&resolved.mesh, &placeholder_mesh()));
        assert_eq!(resolved.header.maximum_height, 0.0);
    }

    #[tokio::test]
    async fn test_request_tile_geometry_uses_fetched_tile() {
        let provider = provider();
        let key = TileKey::new(2, 1, 3);
        let url = provider.client().tile_url(key);
        provider
            .client()
            .cache()
            .insert(&url, Arc::from(square_tile_bytes()));

        let record = provider.request_tile_geometry(key).await;
        assert_eq!(record.maximum_height, 250.0);
        assert_eq!(record.key, key);
        assert!(!Arc::ptr_eq(&record.mesh, &placeholder_mesh()));
    }

    #[tokio::test]
    async fn test_request_tile_geometry_falls_back_on_bad_bytes() {
        let provider = provider();
        let key = TileKey::new(0, 0, 1);
        let url = provider.client().tile_url(key);
        provider.client().cache().insert(&url, Arc::from(&[0u8; 10][..]));

        let record = provider.request_tile_geometry(key).await;
        assert!(Arc::ptr_eq(&record.mesh, &placeholder_mesh()));
        assert_eq!(record.minimum_height, 0.0);
        assert_eq!(record.maximum_height, 0.0);
    }

    #[test]
    fn test_geometric_error_per_level() {
        let provider = provider();
        let zero = provider.level_maximum_geometric_error(0);
        assert_eq!(provider.level_maximum_geometric_error(1), zero / 2.0);
        assert_eq!(provider.level_maximum_geometric_error(5), zero / 32.0);
    }

    #[test]
    fn test_geographic_root_error_is_halved() {
        let geographic = TerrainProvider::new(
            GeographicTilingScheme::default(),
            UrlTemplate::new("mem://{z}/{x}/{y}"),
            ProviderOptions::default(),
            MemoryCache::new(),
        );
        let mercator = provider();
        let ratio =
            mercator.level_maximum_geometric_error(0) / geographic.level_maximum_geometric_error(0);
        assert!((ratio - 2.0).abs() < 1e-12);
        assert!(geographic.tile_data_available(TileKey::new(7, 7, 7)));
    }
}
