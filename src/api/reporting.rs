//! Error-reporting middleware

use std::any::Any;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use crate::api::{ApiError, AppState};
use crate::telemetry::{panic_message, Item, Level, Telemetry};

/// Forward every handler failure to the error reporter.
pub async fn report_faults(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    if let Some(error) = response.extensions().get::<ApiError>() {
        let status = response.status();
        tracing::error!(%method, %path, %status, error = %error, "Request failed");

        let mut extra = Map::new();
        extra.insert("method".to_string(), Value::from(method));
        extra.insert("path".to_string(), Value::from(path));
        extra.insert("status".to_string(), Value::from(status.as_u16()));
        state.telemetry.error(error.to_string(), extra);
    }

    response
}

/// Response for a handler that panicked. `reporter` is `None` when the
/// process-wide hook already reported the panic.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>, reporter: Option<&Telemetry>) -> Response {
    let message = panic_message(err.as_ref());
    tracing::error!(panic = %message, "Handler panicked");

    if let Some(telemetry) = reporter {
        telemetry.report(Item::new(Level::Critical, message).with_extra("source", "handler"));
    }

    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::telemetry::testing::RecordingSink;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_panic_response_is_generic() {
        let sink = Arc::new(RecordingSink::default());
        let telemetry = Telemetry::new(sink.clone());

        let response = handle_panic(Box::new("index out of bounds"), Some(&telemetry));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<ApiError>().is_none());

        let items = sink.wait_for(1).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].level, Level::Critical);
        assert_eq!(items[0].message, "index out of bounds");
    }
}
