//! Rollbar item API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{Item, ReportSink};
use crate::{Error, Result};

const ITEM_PATH: &str = "/api/1/item/";
const TOKEN_HEADER: &str = "X-Rollbar-Access-Token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts items to Rollbar
#[derive(Debug, Clone)]
pub struct RollbarSink {
    client: Client,
    access_token: String,
    environment: String,
    item_url: String,
    host: String,
}

impl RollbarSink {
    pub fn new(
        access_token: impl Into<String>,
        environment: impl Into<String>,
        endpoint: impl AsRef<str>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self {
            client,
            access_token: access_token.into(),
            environment: environment.into(),
            item_url: format!("{}{}", endpoint.as_ref().trim_end_matches('/'), ITEM_PATH),
            host,
        })
    }

    /// Build the JSON payload for one item
    pub fn payload(&self, item: &Item) -> Value {
        let mut data = json!({
            "environment": self.environment,
            "level": item.level,
            "timestamp": item.timestamp.timestamp(),
            "platform": std::env::consts::OS,
            "language": "rust",
            "uuid": uuid::Uuid::new_v4(),
            "server": { "host": self.host },
            "notifier": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "body": {
                "message": { "body": item.message }
            },
        });

        if !item.extra.is_empty() {
            data["custom"] = Value::Object(item.extra.clone());
        }

        json!({
            "access_token": self.access_token,
            "data": data,
        })
    }
}

#[async_trait]
impl ReportSink for RollbarSink {
    fn name(&self) -> &'static str {
        "rollbar"
    }

    async fn send(&self, item: &Item) -> Result<()> {
        let response = self
            .client
            .post(&self.item_url)
            .header(TOKEN_HEADER, &self.access_token)
            .json(&self.payload(item))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::telemetry(format!(
                "rollbar rejected item with status {}: {}",
                status, body
            )));
        }

        tracing::trace!(level = %item.level, "Delivered item to Rollbar");
        Ok(())
    }
}
