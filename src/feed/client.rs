//! HTTP client for the lap feed proxy

use crate::domain::FeedError;
use crate::feed::LapFeed;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{header, Method, Request, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Fetches the feed over plain HTTP from the proxy
#[derive(Clone)]
pub struct HttpLapFeed {
    url: Uri,
    timeout: Duration,
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl HttpLapFeed {
    pub fn new(url: Uri, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            url,
            timeout,
            client,
        }
    }

    pub fn url(&self) -> &Uri {
        &self.url
    }

    async fn fetch_body(&self) -> Result<Bytes, FeedError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(self.url.clone())
            .header(header::ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| FeedError::transport(format!("Invalid feed request: {e}")))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| FeedError::transport(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| FeedError::transport(format!("Body collection error: {e}")))?;
        Ok(body.to_bytes())
    }
}

#[async_trait]
impl LapFeed for HttpLapFeed {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Value, FeedError> {
        let body = tokio::time::timeout(self.timeout, self.fetch_body())
            .await
            .map_err(|_| {
                FeedError::transport(format!(
                    "No response within {}ms",
                    self.timeout.as_millis()
                ))
            })??;

        debug!(bytes = body.len(), "Received lap feed body");
        serde_json::from_slice(&body)
            .map_err(|e| FeedError::transport(format!("Feed body is not valid JSON: {e}")))
    }
}
