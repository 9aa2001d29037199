use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{PagerError, Result};
use crate::page::{Page, PageRequest};

/// Where pages come from.
///
/// Futures are not required to be `Send`: loading runs on the UI thread's
/// local task set.
#[allow(async_fn_in_trait)]
pub trait PageSource<T> {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<T>>;
}

/// `GET {base}/api/transcripts` with the query encoded as URL parameters.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPageSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self) -> String {
        format!("{}/api/transcripts", self.base_url)
    }
}

fn query_params(request: &PageRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("location", request.query.location.clone()),
        ("filter", request.query.filter.clone()),
        ("order", request.query.ordering.clone()),
        ("limit", request.limit.to_string()),
        ("direction", request.direction.as_str().to_string()),
    ];
    if let Some(cursor) = &request.cursor {
        params.push(("cursor", cursor.clone()));
    }
    params
}

impl<T: DeserializeOwned> PageSource<T> for HttpPageSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<T>> {
        let resp = self
            .client
            .get(self.url())
            .query(&query_params(request))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PagerError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
