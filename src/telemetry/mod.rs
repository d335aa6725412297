//! Error and log reporting
//!
//! Events are handed to a [`ReportSink`]. Delivery happens on a spawned task
//! so request handlers never wait on the reporting service, and failed
//! deliveries are logged and dropped.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::Result;

pub mod log;
pub mod panic;
pub mod rollbar;

pub use panic::{install_panic_hook, panic_message};

/// Severity of a reported item. Mirrors Rollbar's five item levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single log or error event
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub level: Level,
    pub message: String,
    /// Custom key/value data attached to the event
    pub extra: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl Item {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            extra: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Destination for reported items
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Deliver one item
    async fn send(&self, item: &Item) -> Result<()>;
}

/// Sink configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    /// Write events to the local log only
    Log,
    Rollbar {
        access_token: String,
        environment: String,
        endpoint: String,
    },
}

/// Create a sink from config
pub fn create_sink(config: SinkConfig) -> Result<Arc<dyn ReportSink>> {
    match config {
        SinkConfig::Log => Ok(Arc::new(log::LogSink)),
        SinkConfig::Rollbar {
            access_token,
            environment,
            endpoint,
        } => {
            let sink = rollbar::RollbarSink::new(access_token, environment, endpoint)?;
            Ok(Arc::new(sink))
        }
    }
}

/// Cloneable handle used by the rest of the service to report events
#[derive(Clone)]
pub struct Telemetry {
    sink: Arc<dyn ReportSink>,
}

impl Telemetry {
    pub fn new(sink: Arc<dyn ReportSink>) -> Self {
        Self { sink }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.report(Item::new(Level::Info, message));
    }

    /// Report at the service's default log level (`debug`) with custom data
    pub fn log(&self, message: impl Into<String>, extra: Map<String, Value>) {
        let mut item = Item::new(Level::Debug, message);
        item.extra = extra;
        self.report(item);
    }

    pub fn error(&self, message: impl Into<String>, extra: Map<String, Value>) {
        let mut item = Item::new(Level::Error, message);
        item.extra = extra;
        self.report(item);
    }

    /// Queue an item for delivery without waiting for it.
    pub fn report(&self, item: Item) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    sink = self.sink.name(),
                    level = %item.level,
                    item = %item.message,
                    "No async runtime; dropping telemetry item"
                );
                return;
            }
        };

        let sink = self.sink.clone();
        handle.spawn(async move {
            if let Err(err) = sink.send(&item).await {
                tracing::warn!(
                    sink = sink.name(),
                    error = %err,
                    item = %item.message,
                    "Failed to deliver telemetry item"
                );
            }
        });
    }
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("sink", &self.sink.name())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Sink that keeps every item in memory
    #[derive(Default)]
    pub struct RecordingSink {
        pub items: Mutex<Vec<Item>>,
    }

    impl RecordingSink {
        pub fn snapshot(&self) -> Vec<Item> {
            self.items.lock().unwrap().clone()
        }

        /// Wait until at least `count` items have been delivered.
        pub async fn wait_for(&self, count: usize) -> Vec<Item> {
            for _ in 0..100 {
                let items = self.snapshot();
                if items.len() >= count {
                    return items;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            self.snapshot()
        }
    }

    #[async_trait]
    impl ReportSink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, item: &Item) -> Result<()> {
            self.items.lock().unwrap().push(item.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;

    #[tokio::test]
    async fn test_report_delivers_in_background() {
        let sink = Arc::new(RecordingSink::default());
        let telemetry = Telemetry::new(sink.clone());

        telemetry.info("html file served successfully.");
        let mut extra = Map::new();
        extra.insert("author".into(), "Scott".into());
        telemetry.log("Student added successfully", extra);

        let items = sink.wait_for(2).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].level, Level::Info);
        assert_eq!(items[1].level, Level::Debug);
        assert_eq!(items[1].extra["author"], "Scott");
    }

    #[test]
    fn test_report_without_runtime_is_dropped() {
        let sink = Arc::new(RecordingSink::default());
        let telemetry = Telemetry::new(sink.clone());

        telemetry.info("nobody is listening");
        assert!(sink.snapshot().is_empty());
    }

    #[test]
    fn test_level_wire_names() {
        assert_eq!(
            serde_json::to_value(Level::Warning).unwrap(),
            Value::from("warning")
        );
        assert_eq!(Level::Critical.to_string(), "critical");
        assert!(Level::Error > Level::Info);
    }

    #[test]
    fn test_create_log_sink() {
        let sink = create_sink(SinkConfig::Log).unwrap();
        assert_eq!(sink.name(), "log");
    }
}
