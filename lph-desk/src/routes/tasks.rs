//! HTTP routes for the task queue
//!
//! - GET    /api/tasks               - board (active, completed, pinned)
//! - POST   /api/tasks               - create
//! - POST   /api/tasks/{id}/claim    - Pending → InProgress
//! - POST   /api/tasks/{id}/complete - InProgress → Completed
//! - POST   /api/tasks/{id}/pin      - toggle pin
//! - DELETE /api/tasks/{id}          - delete (ADMIN)

use hyper::body::Incoming;
use hyper::{Request, Response};
use std::sync::Arc;

use lph_core::{DeskError, NewTask, TaskEvent};

use crate::desk::Desk;

use super::response::{parse_json_body, respond, session_id, BoxBody, Operation, SuccessResponse};

pub async fn handle_board(req: Request<Incoming>, desk: Arc<Desk>) -> Response<BoxBody> {
    let result = async {
        let session = session_id(&req)?;
        desk.task_board(&session).await
    }
    .await;
    respond(result, Operation::Load)
}

pub async fn handle_create(req: Request<Incoming>, desk: Arc<Desk>) -> Response<BoxBody> {
    let result = async {
        let session = session_id(&req)?;
        let input: NewTask = parse_json_body(req).await?;
        desk.create_task(&session, input).await
    }
    .await;
    respond(result, Operation::Save)
}

/// POST /api/tasks/{id}/claim | complete | pin
pub async fn handle_transition(
    req: Request<Incoming>,
    desk: Arc<Desk>,
    id: &str,
    event: TaskEvent,
) -> Response<BoxBody> {
    let result = async {
        let session = session_id(&req)?;
        match event {
            TaskEvent::Claim => desk.claim_task(&session, id).await,
            TaskEvent::Complete => desk.complete_task(&session, id).await,
            TaskEvent::TogglePin => desk.toggle_pin(&session, id).await,
            TaskEvent::Create => Err(DeskError::invalid("Use POST /api/tasks to create a task")),
        }
    }
    .await;
    respond(result, Operation::Save)
}

pub async fn handle_delete(req: Request<Incoming>, desk: Arc<Desk>, id: &str) -> Response<BoxBody> {
    let result = async {
        let session = session_id(&req)?;
        desk.delete_task(&session, id).await?;
        Ok::<_, DeskError>(SuccessResponse {
            success: true,
            message: None,
        })
    }
    .await;
    respond(result, Operation::Delete)
}
