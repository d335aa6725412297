//! Shared handler state

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::handlers::BodyRejection;
use crate::api::ApiError;
use crate::config::AppConfig;
use crate::store::StudentStore;
use crate::telemetry::Telemetry;

/// How student submissions with the wrong shape are answered. Bodies that
/// are not valid JSON always get a 400.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Generic 500, as if the handler had failed
    #[default]
    Lenient,
    /// Descriptive 400
    Strict,
}

impl ValidationMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        }
    }

    /// Turn a validation failure into the error this mode answers with.
    pub fn reject(self, rejection: BodyRejection) -> ApiError {
        match (self, rejection) {
            (_, BodyRejection::Syntax(reason)) => ApiError::InvalidJson(reason),
            (ValidationMode::Lenient, BodyRejection::Shape(reason)) => ApiError::Internal(reason),
            (ValidationMode::Strict, BodyRejection::Shape(reason)) => {
                ApiError::MalformedStudent(reason)
            }
        }
    }
}

/// API server state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Submitted student names
    pub store: StudentStore,

    /// Error and log reporting
    pub telemetry: Telemetry,

    /// Landing page served on `GET /`
    pub index_page: Arc<PathBuf>,

    pub validation: ValidationMode,

    /// Report handler panics from the router. Off when the process-wide
    /// panic hook already reports them.
    pub report_handler_panics: bool,
}

impl AppState {
    pub fn new(store: StudentStore, telemetry: Telemetry, index_page: impl Into<PathBuf>) -> Self {
        Self {
            store,
            telemetry,
            index_page: Arc::new(index_page.into()),
            validation: ValidationMode::default(),
            report_handler_panics: true,
        }
    }

    /// Build state with an empty store from loaded configuration
    pub fn from_config(config: &AppConfig, telemetry: Telemetry) -> Self {
        Self::new(StudentStore::new(), telemetry, config.index_page())
            .with_validation(ValidationMode::from_strict(config.server.strict_validation))
            .with_handler_panic_reporting(!config.telemetry.capture_uncaught)
    }

    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_handler_panic_reporting(mut self, enabled: bool) -> Self {
        self.report_handler_panics = enabled;
        self
    }
}
