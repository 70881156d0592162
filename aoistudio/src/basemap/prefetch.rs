//! Low-zoom tile prefetch.
//!
//! At startup every basemap requests a small grid of tiles from the
//! top-left corner of the tile pyramid so the first switch between
//! basemaps does not start from a cold cache. Requests are
//! fire-and-forget: failures are logged and never reach the caller.

use futures::future::join_all;
use tracing::{debug, info};

use crate::coord::{TileCoord, MAX_ZOOM};
use crate::http::AsyncHttpClient;

/// Generate the `grid × grid` block of tiles at `zoom` starting at (0, 0).
///
/// The grid is clipped to the tile count available at that zoom, so
/// `prefetch_grid(1, 4)` yields the four z1 tiles.
///
/// # Example
///
/// ```
/// use aoistudio::basemap::prefetch_grid;
///
/// let tiles = prefetch_grid(5, 4);
/// assert_eq!(tiles.len(), 16);
/// ```
pub fn prefetch_grid(zoom: u8, grid: u32) -> Vec<TileCoord> {
    let zoom = zoom.min(MAX_ZOOM);
    let side = grid.min(1u32 << zoom);

    let mut tiles = Vec::with_capacity((side * side) as usize);
    for col in 0..side {
        for row in 0..side {
            tiles.push(TileCoord::new(col, row, zoom));
        }
    }
    tiles
}

/// Outcome of a warm pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmReport {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Fetches queued prefetch URLs and discards the bodies.
pub struct TileWarmer<C> {
    client: C,
}

impl<C: AsyncHttpClient> TileWarmer<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Request every URL concurrently.
    pub async fn warm(&self, urls: Vec<String>) -> WarmReport {
        let requested = urls.len();
        let results = join_all(urls.iter().map(|url| self.client.get(url))).await;

        let mut report = WarmReport {
            requested,
            ..WarmReport::default()
        };
        for (url, result) in urls.iter().zip(results) {
            match result {
                Ok(_) => report.succeeded += 1,
                Err(e) => {
                    debug!(url = %url, error = %e, "Prefetch request failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            requested = report.requested,
            succeeded = report.succeeded,
            failed = report.failed,
            "Tile prefetch complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::MockAsyncHttpClient;
    use crate::http::HttpError;

    #[test]
    fn test_grid_is_anchored_at_origin() {
        let tiles = prefetch_grid(5, 4);

        assert_eq!(tiles.len(), 16);
        assert!(tiles.iter().all(|t| t.zoom == 5 && t.col < 4 && t.row < 4));
        assert_eq!(tiles[0], TileCoord::new(0, 0, 5));
    }

    #[test]
    fn test_grid_clipped_to_zoom_extent() {
        assert_eq!(prefetch_grid(0, 4).len(), 1);
        assert_eq!(prefetch_grid(1, 4).len(), 4);
    }

    #[test]
    fn test_empty_grid() {
        assert!(prefetch_grid(5, 0).is_empty());
    }

    #[tokio::test]
    async fn test_warm_counts_successes() {
        let client = MockAsyncHttpClient::responding(Ok(vec![0u8; 8]));
        let warmer = TileWarmer::new(client.clone());

        let report = warmer
            .warm(vec!["https://a/1.png".into(), "https://b/2.png".into()])
            .await;

        assert_eq!(
            report,
            WarmReport {
                requested: 2,
                succeeded: 2,
                failed: 0
            }
        );
        assert_eq!(client.requested_urls().len(), 2);
    }

    #[tokio::test]
    async fn test_warm_swallows_failures() {
        let client = MockAsyncHttpClient::responding(Err(HttpError::Status {
            status: 503,
            url: "https://a/1.png".into(),
        }));
        let warmer = TileWarmer::new(client);

        let report = warmer.warm(vec!["https://a/1.png".into()]).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 0);
    }
}
