//! HTTP route handlers
//!
//! Every handler takes the request and the shared [`Desk`] and always
//! produces a response; errors are mapped in [`response::error_response`].

pub mod assistant;
pub mod auth;
pub mod collections;
pub mod response;
pub mod tasks;

use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use std::sync::Arc;

use lph_core::TaskEvent;

use crate::desk::Desk;

pub use auth::handle_auth_request;
pub use response::BoxBody;

/// Route /api/* requests
pub async fn handle_api_request(req: Request<Incoming>, desk: Arc<Desk>) -> Response<BoxBody> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        (Method::OPTIONS, _) => response::cors_preflight(),

        (Method::GET, ["api", "session"]) => auth::handle_session(req, desk).await,

        (Method::GET, ["api", "collections", name]) => {
            collections::handle_list(req, desk, name).await
        }
        (Method::POST, ["api", "collections", name]) => {
            collections::handle_upsert(req, desk, name).await
        }
        (Method::DELETE, ["api", "collections", name, id]) => {
            collections::handle_delete(req, desk, name, id).await
        }
        (Method::GET, ["api", "finance", "drift"]) => collections::handle_drift(req, desk).await,

        (Method::GET, ["api", "tasks"]) => tasks::handle_board(req, desk).await,
        (Method::POST, ["api", "tasks"]) => tasks::handle_create(req, desk).await,
        (Method::POST, ["api", "tasks", id, "claim"]) => {
            tasks::handle_transition(req, desk, id, TaskEvent::Claim).await
        }
        (Method::POST, ["api", "tasks", id, "complete"]) => {
            tasks::handle_transition(req, desk, id, TaskEvent::Complete).await
        }
        (Method::POST, ["api", "tasks", id, "pin"]) => {
            tasks::handle_transition(req, desk, id, TaskEvent::TogglePin).await
        }
        (Method::DELETE, ["api", "tasks", id]) => tasks::handle_delete(req, desk, id).await,

        (Method::GET, ["api", "context"]) => assistant::handle_context(req, desk).await,
        (Method::GET, ["api", "assistant", "insight"]) => {
            assistant::handle_insight(req, desk).await
        }
        (Method::POST, ["api", "assistant", "chat"]) => assistant::handle_chat(req, desk).await,

        _ => response::not_found_response(&path),
    }
}
