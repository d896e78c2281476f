//! Record types and their static field schemas
//!
//! Every entity kind declares, at compile time, which of its fields are
//! public. The set never varies by record; [`crate::policy`] reads it to
//! decide field visibility for guests.

mod business;
mod office;
mod people;
mod user;

pub use business::{CertifiedBusiness, InProcessBusiness, ProspectBusiness};
pub use office::{Asset, AssetCondition, Document, FinanceEntry, Letter, LetterKind, ScheduleActivity};
pub use people::{Auditor, InternalMember, Partner};
pub use user::{AppUser, UserSummary};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{DeskError, Result};
use crate::task::Task;

/// Untyped record as exchanged with the record store and the API
pub type Record = serde_json::Map<String, Value>;

/// Identifier field present on every record
pub const ID_FIELD: &str = "id";

/// Denormalized attribution fields (name strings, not references)
pub const ATTRIBUTION_FIELDS: &[&str] = &["createdBy", "updatedBy", "updatedAt"];

/// A typed record stored in one collection
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Serialize into an untyped record
    fn to_record(&self) -> Record {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Record::new(),
        }
    }

    fn from_record(record: Record) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(record))?)
    }
}

/// Attribution stamped onto business records at write time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Attribution {
    /// Drop client-supplied attribution and stamp the acting user.
    ///
    /// Creates record `createdBy`; updates record `updatedBy` and
    /// `updatedAt`, leaving the stored `createdBy` to survive the merge.
    pub fn stamp(record: &mut Record, actor: &str, is_create: bool, now: DateTime<Utc>) {
        for field in ATTRIBUTION_FIELDS {
            record.remove(*field);
        }
        if is_create {
            record.insert("createdBy".into(), Value::String(actor.to_string()));
        } else {
            record.insert("updatedBy".into(), Value::String(actor.to_string()));
            record.insert("updatedAt".into(), Value::String(now.to_rfc3339()));
        }
    }
}

/// Every record type the back office manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    CertifiedBusiness,
    InProcessBusiness,
    ProspectBusiness,
    FinanceEntry,
    ScheduleActivity,
    Asset,
    Document,
    Letter,
    InternalMember,
    Auditor,
    Partner,
    AppUser,
    Task,
}

impl EntityKind {
    pub const ALL: [EntityKind; 13] = [
        EntityKind::CertifiedBusiness,
        EntityKind::InProcessBusiness,
        EntityKind::ProspectBusiness,
        EntityKind::FinanceEntry,
        EntityKind::ScheduleActivity,
        EntityKind::Asset,
        EntityKind::Document,
        EntityKind::Letter,
        EntityKind::InternalMember,
        EntityKind::Auditor,
        EntityKind::Partner,
        EntityKind::AppUser,
        EntityKind::Task,
    ];

    /// Store collection (and API path segment) for this kind
    pub fn collection_name(self) -> &'static str {
        match self {
            EntityKind::CertifiedBusiness => "pu_certified",
            EntityKind::InProcessBusiness => "pu_on_process",
            EntityKind::ProspectBusiness => "pu_prospect",
            EntityKind::FinanceEntry => "finance_records",
            EntityKind::ScheduleActivity => "activities",
            EntityKind::Asset => "assets",
            EntityKind::Document => "documentation",
            EntityKind::Letter => "letters",
            EntityKind::InternalMember => "internal_members",
            EntityKind::Auditor => "auditors",
            EntityKind::Partner => "partners",
            EntityKind::AppUser => "app_users",
            EntityKind::Task => "tasks",
        }
    }

    /// Schema fields, excluding `id` and attribution
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::CertifiedBusiness => &[
                "regNo",
                "businessName",
                "ownerName",
                "waNumber",
                "email",
                "businessAddress",
                "productionAddress",
                "nib",
                "halalId",
                "expiryDate",
            ],
            EntityKind::InProcessBusiness => &[
                "regNo",
                "businessName",
                "ownerName",
                "waNumber",
                "email",
                "socialMedia",
                "businessAddress",
                "productionAddress",
                "nib",
                "status",
            ],
            EntityKind::ProspectBusiness => &[
                "businessName",
                "ownerName",
                "waNumber",
                "email",
                "socialMedia",
                "followUpDate",
                "notes",
            ],
            EntityKind::FinanceEntry => &["date", "description", "debit", "credit", "balance"],
            EntityKind::ScheduleActivity => {
                &["delegates", "event", "location", "time", "date", "notes"]
            }
            EntityKind::Asset => &["assetNo", "name", "receivedDate", "estimatedValue", "condition"],
            EntityKind::Document => &["title", "category", "uploadDate", "link"],
            EntityKind::Letter => &["title", "letterNumber", "date", "type", "link"],
            EntityKind::InternalMember => &["fullName", "position", "address", "waNumber", "email"],
            EntityKind::Auditor => &[
                "fullName",
                "position",
                "certNumber",
                "address",
                "waNumber",
                "email",
            ],
            EntityKind::Partner => &["fullName", "position", "cert", "address", "waNumber", "email"],
            // passwordHash is storage-only and deliberately absent
            EntityKind::AppUser => &["username", "fullName", "role"],
            EntityKind::Task => &[
                "title",
                "description",
                "isPinned",
                "status",
                "createdBy",
                "createdAt",
                "inProgressBy",
                "inProgressAt",
                "completedBy",
                "completedAt",
            ],
        }
    }

    /// Fields a PUBLIC viewer may see
    pub fn public_fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::CertifiedBusiness => &["regNo", "businessName", "halalId", "expiryDate"],
            EntityKind::InProcessBusiness => &["regNo", "businessName", "status"],
            EntityKind::InternalMember | EntityKind::Auditor => &["fullName", "position"],
            EntityKind::Partner => &["fullName"],
            EntityKind::ScheduleActivity => {
                &["delegates", "event", "location", "time", "date", "notes"]
            }
            EntityKind::ProspectBusiness
            | EntityKind::FinanceEntry
            | EntityKind::Asset
            | EntityKind::Document
            | EntityKind::Letter
            | EntityKind::AppUser
            | EntityKind::Task => &[],
        }
    }

    /// Fields that must be present and non-empty on create
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::CertifiedBusiness => {
                &["regNo", "businessName", "halalId", "expiryDate", "waNumber"]
            }
            EntityKind::InProcessBusiness => &["regNo", "businessName"],
            EntityKind::ProspectBusiness => &["businessName"],
            EntityKind::FinanceEntry => &["date", "description"],
            EntityKind::ScheduleActivity => &["event", "date"],
            EntityKind::Asset => &["name"],
            EntityKind::Document | EntityKind::Task => &["title"],
            EntityKind::Letter => &["title", "letterNumber"],
            EntityKind::InternalMember | EntityKind::Auditor | EntityKind::Partner => {
                &["fullName"]
            }
            EntityKind::AppUser => &["username"],
        }
    }

    /// Whether records of this kind carry createdBy/updatedBy/updatedAt
    pub fn has_attribution(self) -> bool {
        !matches!(self, EntityKind::AppUser | EntityKind::Task)
    }

    /// Check required fields on a record about to be written
    pub fn check_required(self, record: &Record) -> Result<()> {
        let missing: Vec<&str> = self
            .required_fields()
            .iter()
            .copied()
            .filter(|field| match record.get(*field) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DeskError::invalid(format!(
                "{} is missing required field(s): {}",
                self,
                missing.join(", ")
            )))
        }
    }

    /// Round-trip a record through the typed struct for this kind.
    ///
    /// Unknown keys are dropped and value types are checked; a wrongly typed
    /// field is a validation error.
    pub fn conform(self, record: Record) -> Result<Record> {
        match self {
            EntityKind::CertifiedBusiness => conform_as::<CertifiedBusiness>(record),
            EntityKind::InProcessBusiness => conform_as::<InProcessBusiness>(record),
            EntityKind::ProspectBusiness => conform_as::<ProspectBusiness>(record),
            EntityKind::FinanceEntry => conform_as::<FinanceEntry>(record),
            EntityKind::ScheduleActivity => conform_as::<ScheduleActivity>(record),
            EntityKind::Asset => conform_as::<Asset>(record),
            EntityKind::Document => conform_as::<Document>(record),
            EntityKind::Letter => conform_as::<Letter>(record),
            EntityKind::InternalMember => conform_as::<InternalMember>(record),
            EntityKind::Auditor => conform_as::<Auditor>(record),
            EntityKind::Partner => conform_as::<Partner>(record),
            EntityKind::AppUser => conform_as::<AppUser>(record),
            EntityKind::Task => conform_as::<Task>(record),
        }
    }
}

fn conform_as<T: Entity>(record: Record) -> Result<Record> {
    Ok(T::from_record(record)?.to_record())
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::CertifiedBusiness => "certified business",
            EntityKind::InProcessBusiness => "in-process business",
            EntityKind::ProspectBusiness => "prospect business",
            EntityKind::FinanceEntry => "finance entry",
            EntityKind::ScheduleActivity => "schedule activity",
            EntityKind::Asset => "asset",
            EntityKind::Document => "document",
            EntityKind::Letter => "letter",
            EntityKind::InternalMember => "internal member",
            EntityKind::Auditor => "auditor",
            EntityKind::Partner => "partner",
            EntityKind::AppUser => "user",
            EntityKind::Task => "task",
        };
        f.write_str(label)
    }
}

impl FromStr for EntityKind {
    type Err = DeskError;

    /// Parse a collection name as used in store collections and API paths
    fn from_str(s: &str) -> Result<Self> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.collection_name() == s)
            .ok_or_else(|| DeskError::NotFound(format!("Unknown collection '{s}'")))
    }
}

/// Read the `id` of an untyped record, if assigned
pub fn record_id(record: &Record) -> Option<&str> {
    record
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_public_fields_are_schema_fields() {
        for kind in EntityKind::ALL {
            for field in kind.public_fields() {
                assert!(
                    kind.fields().contains(field),
                    "{kind}: public field {field} not in schema"
                );
            }
            for field in kind.required_fields() {
                assert!(kind.fields().contains(field), "{kind}: required {field}");
            }
        }
    }

    #[test]
    fn test_collection_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.collection_name().parse::<EntityKind>().unwrap(), kind);
        }
        assert!("nope".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_check_required() {
        let ok = record(json!({"date": "2024-01-01", "description": "Fee"}));
        assert!(EntityKind::FinanceEntry.check_required(&ok).is_ok());

        let blank = record(json!({"date": "2024-01-01", "description": "  "}));
        let err = EntityKind::FinanceEntry.check_required(&blank).unwrap_err();
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn test_conform_drops_unknown_keys() {
        let raw = record(json!({
            "regNo": "SH-001",
            "businessName": "Bakery UNISMA",
            "injected": true
        }));
        let conformed = EntityKind::CertifiedBusiness.conform(raw).unwrap();
        assert!(conformed.get("injected").is_none());
        assert_eq!(conformed["regNo"], "SH-001");
        assert!(record_id(&conformed).is_none());
    }

    #[test]
    fn test_conform_rejects_wrong_types() {
        let raw = record(json!({"date": "2024-01-01", "description": "x", "debit": "lots"}));
        assert!(matches!(
            EntityKind::FinanceEntry.conform(raw),
            Err(DeskError::Validation(_))
        ));
    }

    #[test]
    fn test_stamp_attribution() {
        let now = Utc::now();
        let mut create = record(json!({"createdBy": "spoofed", "updatedBy": "x"}));
        Attribution::stamp(&mut create, "staff_unisma", true, now);
        assert_eq!(create["createdBy"], "staff_unisma");
        assert!(create.get("updatedBy").is_none());

        let mut update = record(json!({"createdBy": "spoofed"}));
        Attribution::stamp(&mut update, "ahmad_fauzi", false, now);
        assert!(update.get("createdBy").is_none());
        assert_eq!(update["updatedBy"], "ahmad_fauzi");
        assert!(update.contains_key("updatedAt"));
    }
}
