use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use super::source::FeedSource;
use crate::error::FeedError;

/// How the feed API key rides on the request, for providers that want one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ApiKeyStyle {
    /// `x-api-key` request header.
    #[default]
    Header,
    /// `key` query parameter.
    Query,
}

/// Fetches the feed over HTTP with a hard per-request deadline.
pub struct HttpSource {
    client: Client,
    url: String,
    api_key: Option<(ApiKeyStyle, String)>,
}

impl HttpSource {
    pub fn new(url: String, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpSource {
            client,
            url,
            api_key: None,
        })
    }

    /// Attaches an API key, sent per `style` on every request.
    pub fn with_api_key(mut self, style: ApiKeyStyle, key: String) -> Self {
        self.api_key = Some((style, key));
        self
    }
}

#[async_trait]
impl FeedSource for HttpSource {
    async fn fetch(&self) -> Result<Bytes, FeedError> {
        let mut request = self.client.get(&self.url);
        if let Some((style, key)) = &self.api_key {
            request = match style {
                ApiKeyStyle::Header => request.header("x-api-key", key),
                ApiKeyStyle::Query => request.query(&[("key", key.as_str())]),
            };
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }
        Ok(response.bytes().await?)
    }
}
