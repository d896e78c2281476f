//! LPH Desk - back office service for LPH UNISMA
//!
//! Wires the pure policy and task logic of [`lph_core`] to a record store,
//! per-viewer sessions and the AI assistant, and exposes it all as a JSON
//! HTTP API.
//!
//! ## Components
//!
//! - **Desk**: service container; every operation enters through a session
//! - **Sessions**: opaque bearer ids, each with its own collection copy and
//!   a task refresher that also re-validates the viewer's role
//! - **Server**: hyper http1 JSON API (`/auth/*`, `/api/*`, `/health`)

pub mod auth;
pub mod config;
pub mod desk;
pub mod refresher;
pub mod routes;
pub mod server;

pub use config::Args;
pub use desk::{AdminSeed, Desk, DeskConfig, Insight};
pub use server::{run, serve};
