//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo, one spawned task per connection.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::desk::Desk;
use crate::routes::{self, response, BoxBody};

/// Bind `listen` and serve until the task is dropped
pub async fn run(desk: Arc<Desk>, listen: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(listen).await?;
    serve(desk, listener).await
}

/// Serve connections from an already bound listener
pub async fn serve(desk: Arc<Desk>, listener: TcpListener) -> std::io::Result<()> {
    info!("LPH Desk listening on {}", listener.local_addr()?);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let desk = Arc::clone(&desk);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let desk = Arc::clone(&desk);
                        async move { handle_request(desk, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        debug!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_request(
    desk: Arc<Desk>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("[{}] {} {}", addr, method, path);

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/health") => response::ok_response(&json!({
            "status": "ok",
            "sessions": desk.sessions().len(),
            "store": desk.store().name(),
            "assistant": desk.assistant().is_configured(),
        })),
        (_, p) if p.starts_with("/auth/") => routes::handle_auth_request(req, desk).await,
        (_, p) if p.starts_with("/api/") => routes::handle_api_request(req, desk).await,
        (&Method::OPTIONS, _) => response::cors_preflight(),
        _ => response::not_found_response(&path),
    };

    info!("[{}] {} {} -> {}", addr, method, path, response.status().as_u16());
    Ok(response)
}
