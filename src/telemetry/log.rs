//! Sink that writes items to the local tracing subscriber

use async_trait::async_trait;

use super::{Item, Level, ReportSink};
use crate::Result;

/// Used when no reporting service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl ReportSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, item: &Item) -> Result<()> {
        let extra = serde_json::Value::Object(item.extra.clone());
        match item.level {
            Level::Debug => tracing::debug!(%extra, "{}", item.message),
            Level::Info => tracing::info!(%extra, "{}", item.message),
            Level::Warning => tracing::warn!(%extra, "{}", item.message),
            Level::Error | Level::Critical => {
                tracing::error!(level = %item.level, %extra, "{}", item.message)
            }
        }
        Ok(())
    }
}
