use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::PollenDataset;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Pollen hazard index published by the Deutscher Wetterdienst.
pub const DEFAULT_DATASET_URL: &str =
    "https://opendata.dwd.de/climate_environment/health/alerts/s31fg.json";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid dataset url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Http {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with status {status}")]
    Status { url: Url, status: u16 },
    #[error("failed to decode dataset from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn fetch(&self) -> Result<PollenDataset, FetchError>;
}

pub struct DwdClient {
    http: Client,
    url: Url,
}

impl DwdClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pollenflug/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Self::with_client(http, url)
    }

    pub fn with_client(http: Client, url: &str) -> Result<Self, FetchError> {
        let url = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl DatasetSource for DwdClient {
    async fn fetch(&self) -> Result<PollenDataset, FetchError> {
        debug!(url = %self.url, "fetching pollen dataset");
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let dataset: PollenDataset =
            response.json().await.map_err(|source| FetchError::Decode {
                url: self.url.clone(),
                source,
            })?;
        info!(
            regions = dataset.content.len(),
            last_update = %dataset.last_update,
            "pollen dataset fetched"
        );
        Ok(dataset)
    }
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
