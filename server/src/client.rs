//! HTTP client for the remote product snapshot.

use replication_engine::{ClientError, Product, ProductClient, ProductId};
use serde::Deserialize;
use std::time::Duration;

/// A product as served by the remote source.
#[derive(Debug, Deserialize)]
pub struct RemoteProduct {
    pub id: ProductId,
    pub name: String,
}

impl From<RemoteProduct> for Product {
    fn from(remote: RemoteProduct) -> Self {
        Product::new(remote.id, remote.name)
    }
}

/// Fetches the full product snapshot with a single GET request.
#[derive(Debug, Clone)]
pub struct HttpProductClient {
    http: reqwest::Client,
    url: String,
}

impl HttpProductClient {
    /// Create a client for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

impl ProductClient for HttpProductClient {
    async fn fetch(&self) -> Result<Vec<Product>, ClientError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let remote: Vec<RemoteProduct> = response.json().await.map_err(|e| {
            if e.is_decode() {
                ClientError::Decode(e.to_string())
            } else {
                ClientError::Transport(e.to_string())
            }
        })?;

        tracing::debug!(count = remote.len(), url = %self.url, "Fetched remote products");

        Ok(remote.into_iter().map(Product::from).collect())
    }
}
