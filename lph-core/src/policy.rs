//! Access policy: the single table every read, render and mutation consults
//!
//! Three questions are answered here, all pure:
//! - may this role see this field of this kind?
//! - may this role see this collection at all (records vs sentinel)?
//! - may this role perform this action on this kind?
//!
//! A denied read is never an error; it is a sentinel string in place of
//! the collection. A denied mutation is [`DeskError::PermissionDenied`].

use serde::Serialize;
use std::fmt;

use crate::entity::{EntityKind, Record, ATTRIBUTION_FIELDS, ID_FIELD};
use crate::error::{DeskError, Result};
use crate::role::Role;

/// Sentinel returned to PUBLIC viewers for restricted collections
pub const GUEST_DENIED: &str = "ACCESS_DENIED_FOR_GUEST";

/// Sentinel returned to USER viewers for admin-only collections
pub const NON_ADMIN_DENIED: &str = "ACCESS_DENIED_FOR_NON_ADMIN";

/// Collection visibility tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    AlwaysPublic,
    StaffAndAbove,
    AdminOnly,
}

impl EntityKind {
    /// Visibility tier, or `None` for kinds outside the tier table
    pub fn tier(self) -> Option<Tier> {
        match self {
            EntityKind::CertifiedBusiness
            | EntityKind::InternalMember
            | EntityKind::Auditor
            | EntityKind::ScheduleActivity => Some(Tier::AlwaysPublic),

            EntityKind::InProcessBusiness
            | EntityKind::ProspectBusiness
            | EntityKind::FinanceEntry
            | EntityKind::Partner => Some(Tier::StaffAndAbove),

            EntityKind::Asset
            | EntityKind::Document
            | EntityKind::Letter
            | EntityKind::AppUser => Some(Tier::AdminOnly),

            EntityKind::Task => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied(&'static str),
}

impl Access {
    pub fn is_granted(self) -> bool {
        self == Access::Granted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Read => write!(f, "read"),
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// Either the viewer's data or the sentinel explaining why it is withheld.
///
/// Serializes untagged: a granted value as itself, a denial as the bare
/// sentinel string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Gated<T> {
    Granted(T),
    Denied(&'static str),
}

impl<T> Gated<T> {
    pub fn is_denied(&self) -> bool {
        matches!(self, Gated::Denied(_))
    }

    pub fn granted(self) -> Option<T> {
        match self {
            Gated::Granted(value) => Some(value),
            Gated::Denied(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Gated<U> {
        match self {
            Gated::Granted(value) => Gated::Granted(f(value)),
            Gated::Denied(sentinel) => Gated::Denied(sentinel),
        }
    }
}

/// Field-level visibility. Staff see everything; PUBLIC only flagged fields.
pub fn can_read_field(role: Role, kind: EntityKind, field: &str) -> bool {
    role.is_staff() || kind.public_fields().contains(&field)
}

/// Collection-level visibility
pub fn collection_access(role: Role, kind: EntityKind) -> Access {
    match (kind.tier(), role) {
        (Some(Tier::AlwaysPublic), _) => Access::Granted,
        (_, Role::Admin) => Access::Granted,
        (Some(Tier::AdminOnly), Role::User) => Access::Denied(NON_ADMIN_DENIED),
        (_, Role::User) => Access::Granted,
        // Staff-gated, admin-only and uncovered kinds all close to guests
        (_, Role::Public) => Access::Denied(GUEST_DENIED),
    }
}

/// Role-level mutation rights, independent of the resource
pub fn can_mutate(role: Role, action: Action) -> bool {
    match action {
        Action::Read => true,
        Action::Create | Action::Update => role.is_staff(),
        Action::Delete => role.is_admin(),
    }
}

/// The centralized permission check: role may act AND may see the resource
pub fn permits(role: Role, kind: EntityKind, action: Action) -> bool {
    collection_access(role, kind).is_granted() && can_mutate(role, action)
}

/// [`permits`] as a `Result`, for mutation paths
pub fn authorize(role: Role, kind: EntityKind, action: Action) -> Result<()> {
    if permits(role, kind, action) {
        Ok(())
    } else {
        tracing::debug!(%role, %kind, %action, "Permission denied");
        Err(DeskError::denied(format!(
            "{role} may not {action} {kind} records"
        )))
    }
}

/// Copy of `record` containing only what `role` may see.
///
/// Staff keep schema fields plus `id` and attribution; PUBLIC keeps only
/// public fields. Anything outside the schema (e.g. `passwordHash`) is
/// always dropped.
pub fn redact(role: Role, kind: EntityKind, record: &Record) -> Record {
    record
        .iter()
        .filter(|(field, _)| visible(role, kind, field))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

fn visible(role: Role, kind: EntityKind, field: &str) -> bool {
    if role.is_staff() {
        field == ID_FIELD
            || kind.fields().contains(&field)
            || (kind.has_attribution() && ATTRIBUTION_FIELDS.contains(&field))
    } else {
        kind.public_fields().contains(&field)
    }
}

/// Gate and redact a whole collection in one step
pub fn gate_collection(role: Role, kind: EntityKind, records: &[Record]) -> Gated<Vec<Record>> {
    match collection_access(role, kind) {
        Access::Granted => Gated::Granted(
            records
                .iter()
                .map(|record| redact(role, kind, record))
                .collect(),
        ),
        Access::Denied(sentinel) => Gated::Denied(sentinel),
    }
}
