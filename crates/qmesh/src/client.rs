//! HTTP client for quantized-mesh tile servers.

use std::sync::Arc;

use qmesh_decode::DecodedTile;

use crate::cache::{Cache, NoCache};
use crate::error::Error;
use crate::options::UrlTemplate;
use crate::tiling::{TileKey, TilingScheme};

/// Builds the request URL for a tile.
pub type UrlFn = Arc<dyn Fn(TileKey) -> String + Send + Sync>;

/// Fetches and decodes tiles. Cheap to share behind an [`Arc`].
pub struct Client<C = NoCache> {
    http: reqwest::Client,
    url: UrlFn,
    cache: C,
}

impl Client<NoCache> {
    /// Create a client without caching.
    pub fn new(url: impl Fn(TileKey) -> String + Send + Sync + 'static) -> Self {
        Self::with_cache(url, NoCache)
    }
}

impl<C: Cache> Client<C> {
    pub fn with_cache(url: impl Fn(TileKey) -> String + Send + Sync + 'static, cache: C) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: Arc::new(url),
            cache,
        }
    }

    /// Create a client whose URLs come from a template laid over `scheme`.
    pub fn from_template<S: TilingScheme + 'static>(
        template: UrlTemplate,
        scheme: Arc<S>,
        cache: C,
    ) -> Self {
        Self::with_cache(move |key| template.expand(key, scheme.as_ref()), cache)
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn tile_url(&self, key: TileKey) -> String {
        (self.url)(key)
    }

    /// Fetch raw bytes, consulting the cache first.
    ///
    /// Any non-success status is an error.
    pub async fn fetch_bytes_from_url(&self, url: &str) -> Result<Arc<[u8]>, Error> {
        if let Some(bytes) = self.cache.get(url) {
            tracing::debug!(url, "cache hit");
            return Ok(bytes);
        }

        tracing::debug!(url, "fetching");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let bytes: Arc<[u8]> = Arc::from(response.bytes().await?.as_ref());
        self.cache.insert(url, Arc::clone(&bytes));
        Ok(bytes)
    }

    /// Fetch and fully decode one tile.
    ///
    /// Bytes that fail to decode are evicted from the cache so the next
    /// request goes back to the server.
    pub async fn fetch_tile(&self, key: TileKey) -> Result<DecodedTile, Error> {
        let url = self.tile_url(key);
        let bytes = self.fetch_bytes_from_url(&url).await?;
        let tile = qmesh_decode::decode(&bytes).inspect_err(|err| {
            tracing::debug!(url, error = %err, "evicting undecodable tile");
            self.cache.remove(&url);
        })?;
        tracing::debug!(
            %key,
            vertices = tile.vertex_count(),
            triangles = tile.triangle_indices().len() / 3,
            "decoded tile"
        );
        Ok(tile)
    }
}
