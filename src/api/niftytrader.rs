use crate::config::{ProviderConfig, SymbolConfig};
use crate::error::{AppError, Result};
use crate::models::ChainRecord;

use super::ChainProvider;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Every NiftyTrader payload is wrapped in `resultData`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "resultData")]
    result_data: T,
}

#[derive(Debug, Deserialize)]
struct SpotData {
    nifty_value: f64,
}

pub struct NiftyTraderClient {
    client: reqwest::Client,
}

impl NiftyTraderClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| AppError::Provider(format!("invalid user agent: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!("Status {status}: {text}")));
        }

        let body = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| AppError::Provider(format!("unexpected payload from {url}: {e}")))?;
        Ok(envelope.result_data)
    }
}

impl ChainProvider for NiftyTraderClient {
    async fn option_chain(&self, symbol: &SymbolConfig) -> Result<Vec<ChainRecord>> {
        self.get_json(&symbol.oc_url).await
    }

    async fn spot_price(&self, symbol: &SymbolConfig) -> Result<f64> {
        let spot: SpotData = self.get_json(&symbol.spot_url).await?;
        Ok(spot.nifty_value)
    }
}
