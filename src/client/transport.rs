//! HTTP seam of the client.

use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err.to_string())
    }
}

/// Status and raw body of a completed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// A `200 OK` carrying `body`.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests for the client.
///
/// Dropping the returned future must abort the request; that is how
/// superseded requests are cancelled.
pub trait Transport: Send + Sync + 'static {
    fn get(&self, url: &str) -> BoxFuture<'static, Result<TransportResponse, TransportError>>;
}

/// [`Transport`] backed by `reqwest`, resolving URLs against `origin`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    origin: String,
}

impl ReqwestTransport {
    pub fn new(origin: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), origin)
    }

    pub fn with_client(client: reqwest::Client, origin: impl Into<String>) -> Self {
        Self {
            client,
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.origin)
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str) -> BoxFuture<'static, Result<TransportResponse, TransportError>> {
        let request = self.client.get(self.url(url));
        async move {
            let response = request
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();
            Ok(TransportResponse { status, body })
        }
        .boxed()
    }
}
