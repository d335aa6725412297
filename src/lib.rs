//! Roster - a tiny student roster service
//!
//! Serves a static landing page and keeps an in-memory, append-only list of
//! student names submitted through `POST /api/student`. Log events and
//! request failures are forwarded to Rollbar when an access token is
//! configured.

pub mod api;
pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;

pub use error::{Error, Result};
