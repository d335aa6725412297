//! HTTP API server

use std::any::Any;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub mod error;
pub mod handlers;
pub mod reporting;
pub mod state;

pub use error::ApiError;
pub use handlers::BodyRejection;
pub use state::{AppState, ValidationMode};

/// Build the API router using the provided application state
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::index))
        .route("/api/student", post(handlers::add_student));

    with_layers(routes, state)
}

/// Wrap routes in panic recovery, fault reporting and request tracing.
pub fn with_layers(routes: Router<AppState>, state: AppState) -> Router {
    let panic_reporter = state
        .report_handler_panics
        .then(|| state.telemetry.clone());

    routes
        .layer(CatchPanicLayer::custom(
            move |err: Box<dyn Any + Send + 'static>| {
                reporting::handle_panic(err, panic_reporter.as_ref())
            },
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            reporting::report_faults,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
