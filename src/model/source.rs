use std::path::PathBuf;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{AbortHandle, Abortable, Aborted, LocalBoxFuture};
use reqwest::Client;

use crate::error::MapError;
use crate::model::{FeatureCollection, MapResult};

// Where boundary geometry comes from
#[derive(Clone, Debug)]
pub enum BoundarySource {
    Inline(FeatureCollection),
    Http(String),
    Local(PathBuf),
}

impl BoundarySource {
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            BoundarySource::Http(location.to_string())
        } else {
            BoundarySource::Local(PathBuf::from(location))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, BoundarySource::Http(_))
    }

    pub fn as_string(&self) -> String {
        match self {
            BoundarySource::Local(path) => path.to_string_lossy().to_string(),
            BoundarySource::Http(url) => url.clone(),
            BoundarySource::Inline(_) => "<inline>".to_string(),
        }
    }
}

/// Fetches boundary collections, keeping at most one request in flight.
///
/// Starting a new fetch aborts the previous one, and so does dropping the
/// loader. An aborted fetch resolves to [`MapError::Aborted`].
pub struct BoundaryLoader {
    client: Client,
    in_flight: Option<AbortHandle>,
}

impl BoundaryLoader {
    /// `timeout_secs` only applies to native builds. On wasm32 the browser's
    /// fetch owns timeouts and the value is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(timeout_secs: u64) -> MapResult<Self> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;

        Ok(BoundaryLoader {
            client: builder.build()?,
            in_flight: None,
        })
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            tracing::debug!("Aborting in-flight boundary fetch");
            handle.abort();
        }
    }

    /// Starts fetching `url`, aborting whatever was in flight.
    pub fn start(&mut self, url: &str) -> LocalBoxFuture<'static, MapResult<FeatureCollection>> {
        self.cancel();
        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight = Some(handle);

        let request = fetch_collection(self.client.clone(), url.to_string());
        async move {
            match Abortable::new(request, registration).await {
                Ok(result) => result,
                Err(Aborted) => Err(MapError::Aborted),
            }
        }
        .boxed_local()
    }

    /// Resolves any source; only HTTP goes through the abortable path.
    pub async fn load(&mut self, source: BoundarySource) -> MapResult<FeatureCollection> {
        match source {
            BoundarySource::Inline(collection) => Ok(collection),
            BoundarySource::Http(url) => self.start(&url).await,
            BoundarySource::Local(path) => {
                tracing::info!("Loading boundaries from file: {}", path.display());
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    MapError::Io(format!("Failed to read file {}: {}", path.display(), e))
                })?;
                FeatureCollection::from_json_str(&content)
            }
        }
    }
}

impl Drop for BoundaryLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn fetch_collection(client: Client, url: String) -> MapResult<FeatureCollection> {
    tracing::info!("Fetching boundaries from URL: {}", url);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| MapError::Http(format!("Failed to fetch URL: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MapError::Http(format!("{} returned status {}", url, status)));
    }

    let content = response
        .text()
        .await
        .map_err(|e| MapError::Http(format!("Failed to read response: {}", e)))?;
    FeatureCollection::from_json_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_classification() {
        assert!(BoundarySource::from_location("https://example.com/lga.geojson").is_remote());
        assert!(BoundarySource::from_location("http://example.com/lga.geojson").is_remote());
        let local = BoundarySource::from_location("./data/lga.geojson");
        assert!(!local.is_remote());
        assert_eq!(local.as_string(), "./data/lga.geojson");
        assert_eq!(
            BoundarySource::Inline(FeatureCollection::default()).as_string(),
            "<inline>"
        );
    }

    #[test]
    fn test_cancel_without_fetch_is_noop() {
        let mut loader = BoundaryLoader::new(5).unwrap();
        loader.cancel();
        assert!(loader.in_flight.is_none());
    }
}
