//! LPH Assistant - role-aware AI text service
//!
//! Two operations, both string in and string out:
//! - dashboard insight: a short summary of dashboard figures
//! - chat: answers over the viewer's [`lph_core::ContextSnapshot`]
//!
//! The assistant only ever sees what the viewer may see; denied collections
//! reach it as sentinel strings. Backends sit behind [`LlmBackend`].

pub mod backend;
pub mod prompt;
pub mod service;

pub use backend::{CompletionRequest, CompletionResponse, LlmBackend, LlmError, MockBackend, OpenAiBackend};
pub use service::{AssistantError, AssistantService};
