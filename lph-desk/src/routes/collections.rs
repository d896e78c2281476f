//! HTTP routes for the record collections
//!
//! - GET    /api/collections/{name}      - redacted listing or denial sentinel
//! - POST   /api/collections/{name}      - create (no id) or update (with id)
//! - DELETE /api/collections/{name}/{id} - delete (ADMIN)
//! - GET    /api/finance/drift           - ledger balance drift report
//!
//! A denied listing is still a 200: the body is the bare sentinel string.

use hyper::body::Incoming;
use hyper::{Request, Response};
use std::sync::Arc;

use lph_core::{DeskError, EntityKind, Record, Result};

use crate::desk::Desk;

use super::response::{parse_json_body, respond, session_id, BoxBody, Operation, SuccessResponse};

fn kind_of(name: &str) -> Result<EntityKind> {
    name.parse()
}

pub async fn handle_list(req: Request<Incoming>, desk: Arc<Desk>, name: &str) -> Response<BoxBody> {
    let result = async {
        let session = session_id(&req)?;
        desk.list(&session, kind_of(name)?).await
    }
    .await;
    respond(result, Operation::Load)
}

pub async fn handle_upsert(
    req: Request<Incoming>,
    desk: Arc<Desk>,
    name: &str,
) -> Response<BoxBody> {
    let result = async {
        let session = session_id(&req)?;
        let kind = kind_of(name)?;
        let record: Record = parse_json_body(req).await?;
        desk.upsert(&session, kind, record).await
    }
    .await;
    respond(result, Operation::Save)
}

pub async fn handle_delete(
    req: Request<Incoming>,
    desk: Arc<Desk>,
    name: &str,
    id: &str,
) -> Response<BoxBody> {
    let result = async {
        let session = session_id(&req)?;
        desk.delete(&session, kind_of(name)?, id).await?;
        Ok::<_, DeskError>(SuccessResponse {
            success: true,
            message: None,
        })
    }
    .await;
    respond(result, Operation::Delete)
}

pub async fn handle_drift(req: Request<Incoming>, desk: Arc<Desk>) -> Response<BoxBody> {
    let result = async {
        let session = session_id(&req)?;
        desk.ledger_drift(&session).await
    }
    .await;
    respond(result, Operation::Load)
}
