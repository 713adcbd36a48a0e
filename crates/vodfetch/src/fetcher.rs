//! HTTP retrieval of master and media manifests.

use reqwest::{Client, StatusCode, redirect};
use tracing::debug;
use url::Url;

use crate::config::HttpConfig;
use crate::error::DownloadError;
use crate::manifest::{MasterManifest, MediaManifest, parse_master, parse_media};

/// Builds the shared HTTP client from the injected configuration.
pub fn build_client(config: &HttpConfig) -> Result<Client, DownloadError> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(config.connect_timeout)
        .default_headers(config.headers.clone());
    if !config.follow_redirects {
        builder = builder.redirect(redirect::Policy::none());
    }
    builder.build().map_err(DownloadError::from)
}

/// Fetches and parses manifests. One GET per manifest, no retries: a
/// manifest that cannot be retrieved invalidates everything downstream,
/// so any failure here aborts the run.
#[derive(Debug, Clone)]
pub struct ManifestFetcher {
    client: Client,
}

impl ManifestFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_master(&self, url: &Url) -> Result<MasterManifest, DownloadError> {
        let text = self.fetch_text(url, "master manifest fetch").await?;
        parse_master(&text, url)
    }

    pub async fn fetch_media(&self, url: &Url) -> Result<MediaManifest, DownloadError> {
        let text = self.fetch_text(url, "media manifest fetch").await?;
        parse_media(&text, url)
    }

    async fn fetch_text(&self, url: &Url, operation: &'static str) -> Result<String, DownloadError> {
        debug!(url = %url, operation, "fetching manifest");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::http_status(status, url.as_str(), operation));
        }
        let body = response.bytes().await?;
        let text = std::str::from_utf8(&body).map_err(|e| {
            DownloadError::manifest_parse(url.as_str(), format!("manifest is not valid UTF-8: {e}"))
        })?;
        Ok(text.to_owned())
    }
}
