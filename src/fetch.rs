//! HTTP retrieval of the dataset payload.
//!
//! The engine itself never does I/O; this module is the one asynchronous
//! collaborator that brings the dataset into memory. The [`HttpClient`]
//! trait is the test seam — integration code swaps in a canned client
//! instead of a live server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Request, Response};

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Plain [`reqwest`] client. Transport-level gzip is decoded automatically;
/// gzip-at-rest payloads come through verbatim and are handled by
/// `dataset::decompress`.
#[derive(Default)]
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.0.execute(req).await
    }
}

/// Fetches the raw payload at `url`.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Bytes> {
    let req = Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("invalid dataset URL {url}"))?,
    );
    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("dataset fetch failed for {url}"))?;
    Ok(resp.bytes().await?)
}
