//! HTTP routes for sessions
//!
//! - POST /auth/login  - check credentials, open a session
//! - POST /auth/guest  - open a PUBLIC session
//! - POST /auth/logout - close the bearer's session (idempotent)
//! - GET  /api/session - current user of the bearer's session

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use lph_core::UserSummary;

use crate::auth::{extract_token_from_header, Session};
use crate::desk::Desk;

use super::response::{
    cors_preflight, error_response, json_response, not_found_response, ok_response,
    parse_json_body, session_id, BoxBody, Operation, SuccessResponse,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    pub user: UserSummary,
    pub is_guest: bool,
}

impl SessionResponse {
    async fn from_session(session: &Session) -> Self {
        let user = session.user().await;
        Self {
            token: session.id().to_string(),
            is_guest: user.is_guest(),
            user: user.summary(),
        }
    }
}

/// POST /auth/login
async fn handle_login(req: Request<Incoming>, desk: Arc<Desk>) -> Response<BoxBody> {
    let body: LoginRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e, Operation::Load),
    };

    match desk.login(body.username.trim(), &body.password).await {
        Ok(session) => ok_response(&SessionResponse::from_session(&session).await),
        Err(e) => error_response(&e, Operation::Load),
    }
}

/// POST /auth/guest
async fn handle_guest(desk: Arc<Desk>) -> Response<BoxBody> {
    match desk.guest_access().await {
        Ok(session) => ok_response(&SessionResponse::from_session(&session).await),
        Err(e) => error_response(&e, Operation::Load),
    }
}

/// POST /auth/logout
async fn handle_logout(req: Request<Incoming>, desk: Arc<Desk>) -> Response<BoxBody> {
    let header = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if let Some(token) = extract_token_from_header(header) {
        desk.logout(token);
    } else {
        info!("Logout without a session token");
    }

    ok_response(&SuccessResponse {
        success: true,
        message: Some("Logged out".to_string()),
    })
}

/// GET /api/session
pub async fn handle_session(req: Request<Incoming>, desk: Arc<Desk>) -> Response<BoxBody> {
    let session = match session_id(&req).and_then(|id| desk.session(&id)) {
        Ok(session) => session,
        Err(e) => return error_response(&e, Operation::Load),
    };
    json_response(StatusCode::OK, &SessionResponse::from_session(&session).await)
}

/// Route /auth/* requests
pub async fn handle_auth_request(req: Request<Incoming>, desk: Arc<Desk>) -> Response<BoxBody> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::OPTIONS, _) => cors_preflight(),
        (Method::POST, "/auth/login") => handle_login(req, desk).await,
        (Method::POST, "/auth/guest") => handle_guest(desk).await,
        (Method::POST, "/auth/logout") => handle_logout(req, desk).await,
        _ => not_found_response(&path),
    }
}
