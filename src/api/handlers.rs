//! API handlers

use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::api::{ApiError, AppState};

/// Serve the landing page
pub async fn index(State(state): State<AppState>, request: Request) -> Response {
    let response = match ServeFile::new(state.index_page.as_path())
        .oneshot(request)
        .await
    {
        Ok(response) => response,
        Err(never) => match never {},
    };

    if response.status().is_success() {
        state.telemetry.info("html file served successfully.");
    } else {
        tracing::warn!(
            status = %response.status(),
            path = %state.index_page.display(),
            "Landing page not served"
        );
    }

    response.into_response()
}

/// Append a student and return the whole roster
pub async fn add_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Vec<String>>, ApiError> {
    let payload =
        AddStudentRequest::parse(&headers, &body).map_err(|reason| state.validation.reject(reason))?;

    let students = state.store.add(&payload.name).await;

    let mut extra = Map::new();
    extra.insert("author".to_string(), Value::from("Scott"));
    extra.insert("type".to_string(), Value::from("manual entry"));
    state.telemetry.log("Student added successfully", extra);

    Ok(Json(students))
}

#[derive(Debug, Deserialize)]
pub struct AddStudentRequest {
    pub name: String,
}

/// Why a student submission was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyRejection {
    /// The body is not a JSON object or array
    Syntax(String),
    /// The body parsed, but carries no string `name`
    Shape(String),
}

impl AddStudentRequest {
    /// Validate a raw request body. Only JSON bodies with a string `name`
    /// are accepted.
    ///
    /// Bodies without a JSON content type and empty bodies are read as an
    /// empty object, so they fail on shape rather than syntax. Top-level
    /// JSON must be an object or an array.
    pub fn parse(headers: &HeaderMap, body: &[u8]) -> Result<Self, BodyRejection> {
        if !is_json(headers) {
            return Err(BodyRejection::Shape(
                "expected an application/json body".to_string(),
            ));
        }
        if body.is_empty() {
            return Err(BodyRejection::Shape("missing field `name`".to_string()));
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|e| BodyRejection::Syntax(e.to_string()))?;
        match value {
            Value::Object(_) => {
                serde_json::from_value(value).map_err(|e| BodyRejection::Shape(e.to_string()))
            }
            Value::Array(_) => Err(BodyRejection::Shape(
                "expected a JSON object, found an array".to_string(),
            )),
            _ => Err(BodyRejection::Syntax(
                "top-level JSON must be an object or an array".to_string(),
            )),
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn json_headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_parse_accepts_string_name() {
        let headers = json_headers("application/json; charset=utf-8");
        let payload = AddStudentRequest::parse(&headers, br#"{"name":"  Alice  "}"#).unwrap();
        assert_eq!(payload.name, "  Alice  ");
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let headers = json_headers("application/json");

        let bodies: [&[u8]; 5] = [
            b"{}",
            br#"{"name": 42}"#,
            br#"{"name": null}"#,
            br#"["Bob"]"#,
            b"",
        ];
        for body in bodies {
            assert!(
                matches!(
                    AddStudentRequest::parse(&headers, body),
                    Err(BodyRejection::Shape(_))
                ),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let headers = json_headers("application/json");

        let bodies: [&[u8]; 5] = [b"{not json", b"not json", br#""Bob""#, b"42", b"   "];
        for body in bodies {
            assert!(
                matches!(
                    AddStudentRequest::parse(&headers, body),
                    Err(BodyRejection::Syntax(_))
                ),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_parse_requires_json_content_type() {
        let body = br#"{"name":"Bob"}"#;
        assert!(matches!(
            AddStudentRequest::parse(&HeaderMap::new(), body),
            Err(BodyRejection::Shape(_))
        ));
        assert!(matches!(
            AddStudentRequest::parse(&json_headers("text/plain"), body),
            Err(BodyRejection::Shape(_))
        ));
        assert!(AddStudentRequest::parse(&json_headers("application/vnd.api+json"), body).is_ok());
    }
}
