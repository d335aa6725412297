//! Errors returned by handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Handler failure. The response carries a copy of the error in its
/// extensions so the reporting middleware can forward it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Malformed student submission: {0}")]
    MalformedStudent(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) | ApiError::MalformedStudent(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::InvalidJson(_) | ApiError::MalformedStudent(_) => self.to_string(),
            // Internal details go to the reporter, not the client
            ApiError::Internal(_) => "Internal Server Error".to_string(),
        };

        let mut response = (self.status(), body).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_error_hides_details() {
        let response = ApiError::Internal("missing field `name`".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.extensions().get::<ApiError>(),
            Some(&ApiError::Internal("missing field `name`".into()))
        );
    }

    #[test]
    fn test_malformed_student_is_client_error() {
        let response = ApiError::MalformedStudent("expected a string".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.extensions().get::<ApiError>().is_some());
    }
}
