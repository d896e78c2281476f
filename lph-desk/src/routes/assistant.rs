//! HTTP routes for the viewer context and the assistant
//!
//! - GET  /api/context           - viewer-scoped snapshot
//! - GET  /api/assistant/insight - dashboard figures and summary
//! - POST /api/assistant/chat    - one chat turn
//!
//! Assistant failures never surface as errors; the reply is a canned text.

use hyper::body::Incoming;
use hyper::{Request, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use lph_core::DeskError;

use crate::desk::Desk;

use super::response::{parse_json_body, respond, session_id, BoxBody, Operation};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub async fn handle_context(req: Request<Incoming>, desk: Arc<Desk>) -> Response<BoxBody> {
    let result = async {
        let session = session_id(&req)?;
        desk.context(&session).await
    }
    .await;
    respond(result, Operation::Load)
}

pub async fn handle_insight(req: Request<Incoming>, desk: Arc<Desk>) -> Response<BoxBody> {
    let result = async {
        let session = session_id(&req)?;
        desk.insight(&session).await
    }
    .await;
    respond(result, Operation::Load)
}

pub async fn handle_chat(req: Request<Incoming>, desk: Arc<Desk>) -> Response<BoxBody> {
    let result = async {
        let session = session_id(&req)?;
        let body: ChatRequest = parse_json_body(req).await?;
        let reply = desk.chat(&session, &body.message).await?;
        Ok::<_, DeskError>(ChatResponse { reply })
    }
    .await;
    respond(result, Operation::Load)
}
