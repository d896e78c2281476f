//! Finance ledger arithmetic
//!
//! Each entry stores the balance after it was posted. The balance of a new
//! entry derives from the last stored entry in insertion order; earlier
//! entries are never recomputed, so edits can leave the stored balances out
//! of step with the running total. [`drift`] reports where that happened.

use serde::Serialize;

use crate::entity::FinanceEntry;
use crate::error::{DeskError, Result};

/// Balance after posting `debit` and `credit` on top of `previous`,
/// or `None` when it does not fit in an `i64`
pub fn next_balance(previous: i64, debit: i64, credit: i64) -> Option<i64> {
    previous.checked_add(debit)?.checked_sub(credit)
}

/// Balance of the last entry, or zero for an empty ledger
pub fn closing_balance(entries: &[FinanceEntry]) -> i64 {
    entries.last().map(|e| e.balance).unwrap_or(0)
}

/// Fill in the balance of a new entry from the existing ledger
pub fn post(existing: &[FinanceEntry], mut entry: FinanceEntry) -> Result<FinanceEntry> {
    if entry.debit < 0 || entry.credit < 0 {
        return Err(DeskError::invalid("Debit and credit must not be negative"));
    }
    entry.balance = next_balance(closing_balance(existing), entry.debit, entry.credit)
        .ok_or_else(|| DeskError::invalid("Amount out of range"))?;
    Ok(entry)
}

/// Running balance of every entry, recomputed from zero. Saturates at the
/// `i64` bounds; stored records can predate the range check in [`post`].
pub fn running_balances(entries: &[FinanceEntry]) -> Vec<i64> {
    entries
        .iter()
        .scan(0i64, |balance, entry| {
            *balance = balance.saturating_add(entry.debit).saturating_sub(entry.credit);
            Some(*balance)
        })
        .collect()
}

/// An entry whose stored balance disagrees with the recomputed one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDrift {
    pub id: String,
    pub date: String,
    pub stored: i64,
    pub expected: i64,
}

pub fn drift(entries: &[FinanceEntry]) -> Vec<BalanceDrift> {
    entries
        .iter()
        .zip(running_balances(entries))
        .filter(|(entry, expected)| entry.balance != *expected)
        .map(|(entry, expected)| BalanceDrift {
            id: entry.id.clone(),
            date: entry.date.clone(),
            stored: entry.balance,
            expected,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(debit: i64, credit: i64) -> FinanceEntry {
        FinanceEntry {
            date: "2024-01-01".into(),
            description: "entry".into(),
            debit,
            credit,
            ..Default::default()
        }
    }

    #[test]
    fn test_posting_sequence() {
        let mut ledger = Vec::new();
        for (debit, credit) in [(1000, 0), (0, 200), (500, 0)] {
            let posted = post(&ledger, entry(debit, credit)).unwrap();
            ledger.push(posted);
        }
        let balances: Vec<i64> = ledger.iter().map(|e| e.balance).collect();
        assert_eq!(balances, vec![1000, 800, 1300]);
        assert_eq!(running_balances(&ledger), balances);
        assert!(drift(&ledger).is_empty());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        assert!(post(&[], entry(-5, 0)).is_err());
        assert!(post(&[], entry(0, -5)).is_err());
    }

    #[test]
    fn test_overflowing_amount_rejected() {
        let opening = post(&[], entry(1000, 0)).unwrap();
        let err = post(&[opening.clone()], entry(i64::MAX, 0)).unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));

        let mut overdrawn = opening;
        overdrawn.balance = i64::MIN + 10;
        assert!(post(&[overdrawn], entry(0, 100)).is_err());
    }

    #[test]
    fn test_running_balances_saturate() {
        let ledger = vec![entry(i64::MAX, 0), entry(i64::MAX, 0), entry(0, 1)];
        assert_eq!(running_balances(&ledger), vec![i64::MAX, i64::MAX, i64::MAX - 1]);
    }

    #[test]
    fn test_edit_leaves_drift() {
        let mut ledger = Vec::new();
        for (debit, credit) in [(1000, 0), (0, 200), (500, 0)] {
            let mut posted = post(&ledger, entry(debit, credit)).unwrap();
            posted.id = format!("f-{}", ledger.len());
            ledger.push(posted);
        }
        // Editing the first debit does not touch later balances
        ledger[0].debit = 2000;

        let report = drift(&ledger);
        assert_eq!(report.len(), 3);
        assert_eq!(report[2].id, "f-2");
        assert_eq!(report[2].stored, 1300);
        assert_eq!(report[2].expected, 2300);
    }
}
