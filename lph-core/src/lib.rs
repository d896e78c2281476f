//! LPH Core - access control and task workflow for the LPH back office
//!
//! This crate holds the pure decision logic of the back office. Nothing in
//! here performs I/O; the store, the assistant and the HTTP surface live in
//! sibling crates and call into these functions.
//!
//! # Key Components
//!
//! - [`Role`]: privilege tier of the viewer (ADMIN, USER, PUBLIC)
//! - [`EntityKind`]: the record types and their static field schemas
//! - [`policy`]: field visibility, collection tiers and mutation permissions
//! - [`context`]: viewer-scoped snapshot of every collection
//! - [`task`]: the Pending → InProgress → Completed task machine
//! - [`ledger`]: running balance for finance entries
//! - [`dashboard`]: aggregate figures for the dashboard insight
//!
//! # Example
//!
//! ```ignore
//! use lph_core::{Collections, ContextSnapshot, Role};
//!
//! let snapshot = ContextSnapshot::build(Role::Public, &collections);
//! assert!(snapshot.finance.is_denied());
//! ```

pub mod context;
pub mod dashboard;
pub mod entity;
pub mod error;
pub mod ledger;
pub mod policy;
pub mod role;
pub mod task;

pub use context::{Collections, ContextSnapshot};
pub use dashboard::DashboardStats;
pub use entity::{
    AppUser, Asset, AssetCondition, Attribution, Auditor, CertifiedBusiness, Document, Entity,
    EntityKind, FinanceEntry, InProcessBusiness, InternalMember, Letter, LetterKind, Partner,
    ProspectBusiness, Record, ScheduleActivity, UserSummary,
};
pub use error::{AuthError, DeskError, Result};
pub use policy::{Access, Action, Gated, Tier};
pub use role::Role;
pub use task::{NewTask, Task, TaskBoard, TaskEvent, TaskStatus};
