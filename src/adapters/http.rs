use crate::config::toml_config::CarrierConfig;
use crate::domain::ports::RateTransport;
use crate::utils::error::{QuoteError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// reqwest-backed carrier transport. Each request is bounded by the
/// client timeout; a timeout surfaces as an error like any other.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_config(carrier: &CarrierConfig) -> Result<Self> {
        Self::new(Duration::from_secs(carrier.timeout_seconds))
    }
}

#[async_trait]
impl RateTransport for HttpTransport {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await?;

        tracing::debug!("InXpress response status: {}", response.status());

        if !response.status().is_success() {
            return Err(QuoteError::TransportFailure {
                detail: format!("carrier returned HTTP {}", response.status()),
            });
        }

        Ok(response.text().await?)
    }
}
