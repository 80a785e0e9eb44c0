//! Intake for already-normalized transaction drafts handed over by an
//! external import adapter. Parsing bank files is the adapter's problem;
//! this end only validates and stores.

use tracing::{info, warn};
use uuid::Uuid;

use super::TransactionService;
use crate::errors::Result;
use crate::ledger::Transaction;
use crate::storage::FinanceStore;

#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub imported: Vec<Uuid>,
    pub skipped: Vec<SkippedCandidate>,
}

#[derive(Debug, Clone)]
pub struct SkippedCandidate {
    pub index: usize,
    pub description: String,
    pub reason: String,
}

pub struct ImportService;

impl ImportService {
    /// Stores every valid candidate. Invalid ones are skipped and reported
    /// per item instead of failing the batch. Stored candidates go through
    /// the normal transaction path, so balances move and reconciliation
    /// wakes as usual.
    pub fn intake(store: &dyn FinanceStore, candidates: Vec<Transaction>) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        for (index, candidate) in candidates.into_iter().enumerate() {
            let description = candidate.description.clone();
            match TransactionService::add(store, candidate) {
                Ok(id) => report.imported.push(id),
                Err(err) => {
                    warn!(index, %err, "skipping import candidate");
                    report.skipped.push(SkippedCandidate {
                        index,
                        description,
                        reason: err.to_string(),
                    });
                }
            }
        }
        info!(
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            "import batch processed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Card, FundingSource, TransactionKind};
    use crate::storage::{CardStore, MemoryStore, TransactionStore};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn invalid_candidates_are_skipped_not_fatal() {
        let store = MemoryStore::new();
        let card = Card::new("Visa", "Visa", 1000.0, 15, 25);
        let card_id = card.id;
        store.put_card(card).unwrap();

        let good = Transaction::new(
            "Groceries",
            42.0,
            date(2024, 3, 2),
            "food",
            TransactionKind::Expense,
            FundingSource::Card(card_id),
        );
        let mut no_amount = good.clone();
        no_amount.id = Uuid::new_v4();
        no_amount.amount = 0.0;
        let orphan = Transaction::new(
            "Mystery",
            10.0,
            date(2024, 3, 3),
            "misc",
            TransactionKind::Expense,
            FundingSource::Card(Uuid::new_v4()),
        );

        let report = ImportService::intake(&store, vec![good, no_amount, orphan]).unwrap();
        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(report.skipped[1].index, 2);
        assert!(!report.skipped[1].reason.is_empty());
        assert_eq!(store.transactions().unwrap().len(), 1);
    }

    #[test]
    fn empty_batches_produce_an_empty_report() {
        let store = MemoryStore::new();
        let report = ImportService::intake(&store, Vec::new()).unwrap();
        assert!(report.imported.is_empty());
        assert!(report.skipped.is_empty());
    }
}
