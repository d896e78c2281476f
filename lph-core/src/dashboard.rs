//! Dashboard figures, computed from what the viewer may see
//!
//! These figures are also the input of the assistant's dashboard insight,
//! so they must never leak more than the viewer's own redacted view.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::context::Collections;
use crate::entity::{EntityKind, FinanceEntry};
use crate::policy;
use crate::role::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    pub name: &'static str,
    /// Rounded percent of all businesses
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headcount {
    pub name: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBalance {
    /// `YYYY-MM`
    pub month: String,
    pub balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub business_status: Vec<Share>,
    pub people: Vec<Headcount>,
    /// Absent for viewers who cannot read the ledger
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finance_by_month: Option<Vec<MonthlyBalance>>,
}

impl DashboardStats {
    pub fn compute(role: Role, collections: &Collections) -> Self {
        let count = |kind| visible_count(role, kind, collections);

        let certified = count(EntityKind::CertifiedBusiness);
        let on_process = count(EntityKind::InProcessBusiness);
        let prospect = count(EntityKind::ProspectBusiness);
        let total = (certified + on_process + prospect).max(1);

        let business_status = vec![
            Share {
                name: "Certified",
                value: percent(certified, total),
            },
            Share {
                name: "On Process",
                value: percent(on_process, total),
            },
            Share {
                name: "Prospect",
                value: percent(prospect, total),
            },
        ];

        let people = vec![
            Headcount {
                name: "Internal",
                count: count(EntityKind::InternalMember),
            },
            Headcount {
                name: "Auditor",
                count: count(EntityKind::Auditor),
            },
            Headcount {
                name: "Partners",
                count: count(EntityKind::Partner),
            },
        ];

        let finance_by_month = policy::collection_access(role, EntityKind::FinanceEntry)
            .is_granted()
            .then(|| finance_by_month(&collections.typed::<FinanceEntry>()));

        Self {
            business_status,
            people,
            finance_by_month,
        }
    }
}

/// Size of a collection as the viewer sees it; denied counts as empty
fn visible_count(role: Role, kind: EntityKind, collections: &Collections) -> usize {
    if policy::collection_access(role, kind).is_granted() {
        collections.records(kind).len()
    } else {
        0
    }
}

fn percent(part: usize, total: usize) -> u32 {
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// Sum stored balances per calendar month, oldest month first.
/// Entries with an unparseable date are left out.
pub fn finance_by_month(entries: &[FinanceEntry]) -> Vec<MonthlyBalance> {
    let mut months: BTreeMap<(i32, u32), i64> = BTreeMap::new();
    for entry in entries {
        let Ok(date) = NaiveDate::parse_from_str(entry.date.trim(), "%Y-%m-%d") else {
            tracing::debug!(id = %entry.id, date = %entry.date, "Skipping finance entry without a valid date");
            continue;
        };
        let total = months.entry((date.year(), date.month())).or_insert(0);
        *total = total.saturating_add(entry.balance);
    }
    months
        .into_iter()
        .map(|((year, month), balance)| MonthlyBalance {
            month: format!("{year:04}-{month:02}"),
            balance,
        })
        .collect()
}
