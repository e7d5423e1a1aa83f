use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::ProductId,
    error::ApiError,
    protocol::{NewProduct, Product},
};
use tracing::debug;
use url::Url;

use crate::error::StoreError;

/// Remote collection of products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, StoreError>;
    async fn create(&self, draft: &NewProduct) -> Result<Product, StoreError>;
    /// The response body is not read.
    async fn update(&self, product: &Product) -> Result<(), StoreError>;
    /// The response body is not read.
    async fn delete(&self, id: &ProductId) -> Result<(), StoreError>;
}

/// `ProductStore` speaking JSON over HTTP to `{base_url}/api/products`.
#[derive(Debug, Clone)]
pub struct HttpProductStore {
    http: Client,
    base_url: Url,
}

impl HttpProductStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::with_timeout(base_url, None)
    }

    /// Requests never time out unless `timeout` is given.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let parsed = Url::parse(base_url).map_err(|err| StoreError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an http(s) base url".into(),
            });
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, id: Option<&ProductId>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "products"]);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        error: ApiError::from_response(status.as_u16(), &body),
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl ProductStore for HttpProductStore {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let url = self.endpoint(None);
        debug!(%url, "GET products");
        let response = self.http.get(url).send().await?;
        decode_json(ensure_success(response).await?).await
    }

    async fn create(&self, draft: &NewProduct) -> Result<Product, StoreError> {
        let url = self.endpoint(None);
        debug!(%url, "POST product");
        let response = self.http.post(url).json(draft).send().await?;
        decode_json(ensure_success(response).await?).await
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        let url = self.endpoint(Some(&product.id));
        debug!(%url, "PUT product");
        let response = self.http.put(url).json(product).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), StoreError> {
        let url = self.endpoint(Some(id));
        debug!(%url, "DELETE product");
        let response = self.http.delete(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
