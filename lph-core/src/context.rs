//! Viewer-scoped context snapshot
//!
//! The snapshot is what the assistant (and the `/api/context` route) sees:
//! every collection either redacted for the viewer or replaced by the
//! denial sentinel. It is rebuilt from the session's collections on each
//! request.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::entity::{record_id, Entity, EntityKind, Record};
use crate::policy::{self, Gated};
use crate::role::Role;

/// Local copy of the store, keyed by kind.
///
/// Records are kept untyped but conformed: every record has passed through
/// its kind's typed schema once, so typed reads do not fail in practice.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    by_kind: BTreeMap<EntityKind, Vec<Record>>,
}

impl Collections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one collection wholesale, conforming each record.
    /// Records that do not conform are logged and left out.
    pub fn replace(&mut self, kind: EntityKind, records: Vec<Record>) {
        let conformed = records
            .into_iter()
            .filter_map(|record| {
                let id = record_id(&record).unwrap_or_default().to_string();
                match kind.conform(record) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!(%kind, id, error = %e, "Skipping malformed record");
                        None
                    }
                }
            })
            .collect();
        self.by_kind.insert(kind, conformed);
    }

    /// Records of one kind; empty when never loaded
    pub fn records(&self, kind: EntityKind) -> &[Record] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_loaded(&self, kind: EntityKind) -> bool {
        self.by_kind.contains_key(&kind)
    }

    /// Typed view of one kind. Records that fail to decode are skipped.
    pub fn typed<T: Entity>(&self) -> Vec<T> {
        self.records(T::KIND)
            .iter()
            .filter_map(|record| match T::from_record(record.clone()) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    tracing::warn!(kind = %T::KIND, error = %e, "Skipping malformed record");
                    None
                }
            })
            .collect()
    }
}

/// What one viewer may know about the whole back office
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    pub viewer_role: Role,
    pub pu_certified: Gated<Vec<Record>>,
    pub internal: Gated<Vec<Record>>,
    pub auditors: Gated<Vec<Record>>,
    pub schedule: Gated<Vec<Record>>,
    pub pu_on_process: Gated<Vec<Record>>,
    pub pu_prospect: Gated<Vec<Record>>,
    pub finance: Gated<Vec<Record>>,
    pub partners: Gated<Vec<Record>>,
    pub assets: Gated<Vec<Record>>,
    pub letters: Gated<Vec<Record>>,
    pub docs: Gated<Vec<Record>>,
}

impl ContextSnapshot {
    /// Kinds carried in the snapshot, in field order
    pub const KINDS: [EntityKind; 11] = [
        EntityKind::CertifiedBusiness,
        EntityKind::InternalMember,
        EntityKind::Auditor,
        EntityKind::ScheduleActivity,
        EntityKind::InProcessBusiness,
        EntityKind::ProspectBusiness,
        EntityKind::FinanceEntry,
        EntityKind::Partner,
        EntityKind::Asset,
        EntityKind::Letter,
        EntityKind::Document,
    ];

    pub fn build(role: Role, collections: &Collections) -> Self {
        let gate = |kind| policy::gate_collection(role, kind, collections.records(kind));

        let snapshot = Self {
            viewer_role: role,
            pu_certified: gate(EntityKind::CertifiedBusiness),
            internal: gate(EntityKind::InternalMember),
            auditors: gate(EntityKind::Auditor),
            schedule: gate(EntityKind::ScheduleActivity),
            pu_on_process: gate(EntityKind::InProcessBusiness),
            pu_prospect: gate(EntityKind::ProspectBusiness),
            finance: gate(EntityKind::FinanceEntry),
            partners: gate(EntityKind::Partner),
            assets: gate(EntityKind::Asset),
            letters: gate(EntityKind::Letter),
            docs: gate(EntityKind::Document),
        };

        tracing::debug!(
            %role,
            denied = Self::KINDS.iter().filter(|k| snapshot.get(**k).is_some_and(Gated::is_denied)).count(),
            "Built context snapshot"
        );
        snapshot
    }

    /// Entry for a kind, or `None` for kinds not carried in the snapshot
    pub fn get(&self, kind: EntityKind) -> Option<&Gated<Vec<Record>>> {
        Some(match kind {
            EntityKind::CertifiedBusiness => &self.pu_certified,
            EntityKind::InternalMember => &self.internal,
            EntityKind::Auditor => &self.auditors,
            EntityKind::ScheduleActivity => &self.schedule,
            EntityKind::InProcessBusiness => &self.pu_on_process,
            EntityKind::ProspectBusiness => &self.pu_prospect,
            EntityKind::FinanceEntry => &self.finance,
            EntityKind::Partner => &self.partners,
            EntityKind::Asset => &self.assets,
            EntityKind::Letter => &self.letters,
            EntityKind::Document => &self.docs,
            EntityKind::AppUser | EntityKind::Task => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{GUEST_DENIED, NON_ADMIN_DENIED};
    use serde_json::{json, Value};

    fn obj(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn seeded() -> Collections {
        let mut collections = Collections::new();
        collections.replace(
            EntityKind::CertifiedBusiness,
            vec![obj(json!({
                "id": "pu-1",
                "regNo": "SH-2024-001",
                "businessName": "Bakso Pak Kumis",
                "waNumber": "081234567890",
                "halalId": "ID35110000999",
                "expiryDate": "2027-12-31"
            }))],
        );
        collections.replace(
            EntityKind::FinanceEntry,
            vec![obj(json!({
                "id": "f-1",
                "date": "2024-01-05",
                "description": "Biaya sertifikasi",
                "debit": 1000,
                "balance": 1000
            }))],
        );
        collections.replace(
            EntityKind::Letter,
            vec![obj(json!({"id": "l-1", "title": "Undangan", "letterNumber": "1/LPH"}))],
        );
        collections
    }

    #[test]
    fn test_guest_context() {
        let snapshot = ContextSnapshot::build(Role::Public, &seeded());
        assert_eq!(snapshot.viewer_role, Role::Public);

        let certified = snapshot.pu_certified.clone().granted().unwrap();
        assert_eq!(certified.len(), 1);
        assert_eq!(certified[0]["regNo"], "SH-2024-001");
        assert!(certified[0].get("waNumber").is_none());

        for kind in [
            EntityKind::InProcessBusiness,
            EntityKind::ProspectBusiness,
            EntityKind::FinanceEntry,
            EntityKind::Partner,
            EntityKind::Asset,
            EntityKind::Letter,
            EntityKind::Document,
        ] {
            assert_eq!(snapshot.get(kind), Some(&Gated::Denied(GUEST_DENIED)), "{kind}");
        }

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["viewerRole"], "PUBLIC");
        assert_eq!(value["finance"], GUEST_DENIED);
    }

    #[test]
    fn test_user_context() {
        let snapshot = ContextSnapshot::build(Role::User, &seeded());
        let finance = snapshot.finance.clone().granted().unwrap();
        assert_eq!(finance[0]["balance"], 1000);
        assert_eq!(snapshot.letters, Gated::Denied(NON_ADMIN_DENIED));
        assert_eq!(snapshot.assets, Gated::Denied(NON_ADMIN_DENIED));
        assert_eq!(snapshot.docs, Gated::Denied(NON_ADMIN_DENIED));
        assert_eq!(snapshot.partners, Gated::Granted(vec![]));
    }

    #[test]
    fn test_admin_context_sees_everything() {
        let snapshot = ContextSnapshot::build(Role::Admin, &seeded());
        for kind in ContextSnapshot::KINDS {
            assert!(!snapshot.get(kind).unwrap().is_denied(), "{kind}");
        }
        let letters = snapshot.letters.granted().unwrap();
        assert_eq!(letters[0]["letterNumber"], "1/LPH");
    }

    #[test]
    fn test_replace_skips_malformed() {
        let mut collections = Collections::new();
        collections.replace(
            EntityKind::FinanceEntry,
            vec![
                obj(json!({"id": "f-bad", "debit": "seribu"})),
                obj(json!({"id": "f-1", "date": "2024-01-05", "debit": 1000, "balance": 1000})),
            ],
        );
        assert!(collections.is_loaded(EntityKind::FinanceEntry));
        let records = collections.records(EntityKind::FinanceEntry);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], "f-1");
    }
}
