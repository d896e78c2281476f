//! Shared request and response helpers for the JSON API

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use lph_core::{AuthError, DeskError, Result};

use crate::auth::extract_token_from_header;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest JSON body accepted
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What failed, for the generic text of store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Save,
    Delete,
}

impl Operation {
    fn failure_text(self) -> &'static str {
        match self {
            Operation::Load => "Failed to load data",
            Operation::Save => "Save failed",
            Operation::Delete => "Delete failed",
        }
    }
}

pub fn status_for(err: &DeskError) -> StatusCode {
    match err {
        DeskError::Auth(_) => StatusCode::UNAUTHORIZED,
        DeskError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        DeskError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        DeskError::Validation(_) => StatusCode::BAD_REQUEST,
        DeskError::NotFound(_) => StatusCode::NOT_FOUND,
        DeskError::InvalidTransition { .. } | DeskError::Conflict(_) => StatusCode::CONFLICT,
    }
}

/// Map a back-office error to its HTTP response.
///
/// Store failures are logged in full and reported with generic text only.
pub fn error_response(err: &DeskError, operation: Operation) -> Response<BoxBody> {
    let status = status_for(err);
    let message = match err {
        DeskError::Store(detail) => {
            error!(error = %detail, ?operation, "Store failure");
            operation.failure_text().to_string()
        }
        other => {
            if status != StatusCode::UNAUTHORIZED {
                warn!(error = %other, code = other.code(), "Request rejected");
            }
            other.to_string()
        }
    };

    json_response(
        status,
        &ErrorResponse {
            error: message,
            code: Some(err.code().to_string()),
        },
    )
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(full_body(json))
        .unwrap()
}

pub fn ok_response<T: Serialize>(body: &T) -> Response<BoxBody> {
    json_response(StatusCode::OK, body)
}

/// 200 with the value, or the mapped error
pub fn respond<T: Serialize>(result: Result<T>, operation: Operation) -> Response<BoxBody> {
    match result {
        Ok(value) => ok_response(&value),
        Err(e) => error_response(&e, operation),
    }
}

pub fn cors_preflight() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap()
}

pub fn not_found_response(path: &str) -> Response<BoxBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &ErrorResponse {
            error: format!("No route for {path}"),
            code: Some("NO_ROUTE".to_string()),
        },
    )
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

/// Read at most [`MAX_BODY_BYTES`] of body and decode it as JSON
pub async fn parse_json_body<T, B>(req: Request<B>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                DeskError::invalid("Request body too large")
            } else {
                DeskError::invalid(format!("Failed to read body: {e}"))
            }
        })?;

    let bytes = body.to_bytes();
    serde_json::from_slice(&bytes).map_err(|e| DeskError::invalid(format!("Invalid JSON: {e}")))
}

fn get_auth_header<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Session id from the bearer header
pub fn session_id<B>(req: &Request<B>) -> Result<String> {
    extract_token_from_header(get_auth_header(req))
        .map(str::to_string)
        .ok_or_else(|| AuthError::SessionExpired.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lph_core::{TaskEvent, TaskStatus};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DeskError::from(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (DeskError::Store("io".into()), StatusCode::SERVICE_UNAVAILABLE),
            (DeskError::denied("no"), StatusCode::FORBIDDEN),
            (DeskError::invalid("title"), StatusCode::BAD_REQUEST),
            (DeskError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                DeskError::InvalidTransition {
                    from: TaskStatus::Completed,
                    event: TaskEvent::Claim,
                },
                StatusCode::CONFLICT,
            ),
            (DeskError::Conflict("x".into()), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&err), status, "{err}");
        }
    }

    #[tokio::test]
    async fn test_store_errors_are_generic() {
        let response = error_response(
            &DeskError::Store("connection refused to 10.0.0.5".into()),
            Operation::Save,
        );
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Save failed");
        assert_eq!(body["code"], "STORE_ERROR");
    }

    #[tokio::test]
    async fn test_body_limit() {
        let oversized = Request::new(Full::new(Bytes::from(vec![b' '; MAX_BODY_BYTES + 1])));
        let err = parse_json_body::<serde_json::Value, _>(oversized).await.unwrap_err();
        assert!(matches!(&err, DeskError::Validation(m) if m == "Request body too large"));

        let small = Request::new(Full::new(Bytes::from_static(br#"{"message":"halo"}"#)));
        let value: serde_json::Value = parse_json_body(small).await.unwrap();
        assert_eq!(value["message"], "halo");
    }

    #[test]
    fn test_session_id_from_header() {
        let req = Request::builder()
            .header("Authorization", "Bearer 6f1c")
            .body(())
            .unwrap();
        assert_eq!(session_id(&req).unwrap(), "6f1c");

        let anonymous = Request::builder().body(()).unwrap();
        assert!(matches!(
            session_id(&anonymous),
            Err(DeskError::Auth(AuthError::SessionExpired))
        ));
    }
}
