//! Keeps one invoice per card per billing period in sync with the
//! transaction set.
//!
//! The engine is reactive: [`ReconcileEngine::attach`] subscribes it to the
//! store's change feed and every transaction or card mutation wakes it. A
//! pass is cheap and idempotent, so redundant wakeups are harmless; a pass
//! already in flight absorbs them and re-runs once instead of stacking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::errors::{FinanceError, Result};
use crate::ledger::{billing, billing::BillingCycle, Invoice};
use crate::storage::FinanceStore;
use crate::time::Clock;

/// Tally of what one [`ReconcileEngine::reconcile`] call did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub cards_seen: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Cards skipped this pass, e.g. for malformed day anchors.
    pub warnings: Vec<String>,
    /// True when this call ran no pass of its own; a concurrent pass
    /// observed its trigger and reconciled on its behalf.
    pub deferred: bool,
}

impl ReconcileReport {
    fn merge(&mut self, other: ReconcileReport) {
        self.cards_seen += other.cards_seen;
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.warnings.extend(other.warnings);
    }
}

pub struct ReconcileEngine {
    store: Arc<dyn FinanceStore>,
    clock: Arc<dyn Clock>,
    pass_gate: Mutex<()>,
    pending: AtomicBool,
}

impl ReconcileEngine {
    pub fn new(store: Arc<dyn FinanceStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            pass_gate: Mutex::new(()),
            pending: AtomicBool::new(false),
        }
    }

    /// Subscribes the engine to the store's change feed. The listener holds
    /// only a weak reference, so dropping the engine detaches it.
    pub fn attach(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.store.subscribe(Arc::new(move |_event| {
            if let Some(engine) = weak.upgrade() {
                if let Err(err) = engine.reconcile() {
                    warn!(%err, "reconcile pass failed");
                }
            }
        }));
        info!("reconcile engine attached to store feed");
    }

    /// Runs reconciliation now. Concurrent calls collapse into the pass
    /// already running: the flag is raised before trying the gate, and the
    /// gate holder keeps re-running while the flag is set, so every trigger
    /// is observed by some pass.
    pub fn reconcile(&self) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut ran_pass = false;
        loop {
            self.pending.store(true, Ordering::SeqCst);
            {
                let _guard = match self.pass_gate.try_lock() {
                    Ok(guard) => guard,
                    Err(_) => {
                        debug!("reconcile trigger absorbed by running pass");
                        report.deferred = !ran_pass;
                        return Ok(report);
                    }
                };
                while self.pending.swap(false, Ordering::SeqCst) {
                    report.merge(self.run_pass()?);
                    ran_pass = true;
                }
            }
            // A trigger may have slipped in between the last flag check and
            // the gate release; pick it up instead of dropping it.
            if !self.pending.load(Ordering::SeqCst) {
                report.deferred = !ran_pass;
                return Ok(report);
            }
        }
    }

    fn run_pass(&self) -> Result<ReconcileReport> {
        let today = self.clock.today();
        let mut report = ReconcileReport::default();
        let cards = self.store.cards()?;
        let transactions = self.store.transactions()?;

        for card in &cards {
            report.cards_seen += 1;
            let cycle = match billing::current_cycle(card, today) {
                Ok(cycle) => cycle,
                Err(err) => {
                    warn!(card = %card.name, %err, "skipping card during reconcile");
                    report.warnings.push(format!("card `{}`: {err}", card.name));
                    continue;
                }
            };
            let total = billing::cycle_total(card.id, &cycle, &transactions);

            match self.store.invoice_for(card.id, cycle.period)? {
                None => {
                    let invoice = Invoice::new(card.id, cycle.period, total, cycle.end, cycle.due);
                    match self.store.insert_new_invoice(invoice) {
                        Ok(()) => {
                            debug!(card = %card.name, period = %cycle.period, total, "invoice created");
                            report.created += 1;
                        }
                        // Lost a creation race; refresh whatever won instead.
                        Err(FinanceError::DuplicateInvoice { .. }) => {
                            if let Some(existing) = self.store.invoice_for(card.id, cycle.period)? {
                                self.refresh(existing, total, &cycle, &mut report)?;
                            }
                        }
                        Err(other) => return Err(other),
                    }
                }
                Some(existing) => self.refresh(existing, total, &cycle, &mut report)?,
            }
        }

        info!(
            cards = report.cards_seen,
            created = report.created,
            updated = report.updated,
            unchanged = report.unchanged,
            "reconcile pass complete"
        );
        Ok(report)
    }

    /// Recomputes an unpaid invoice in place; a paid invoice is history and
    /// is never touched.
    fn refresh(
        &self,
        mut existing: Invoice,
        total: f64,
        cycle: &BillingCycle,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        if existing.paid {
            report.unchanged += 1;
            return Ok(());
        }
        if existing.total_amount == total
            && existing.closing_date == cycle.end
            && existing.due_date == cycle.due
        {
            report.unchanged += 1;
            return Ok(());
        }
        existing.total_amount = total;
        existing.closing_date = cycle.end;
        existing.due_date = cycle.due;
        self.store.put_invoice(existing)?;
        report.updated += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_accumulates_counts_and_warnings() {
        let mut left = ReconcileReport {
            cards_seen: 2,
            created: 1,
            warnings: vec!["a".into()],
            ..ReconcileReport::default()
        };
        left.merge(ReconcileReport {
            cards_seen: 2,
            unchanged: 2,
            warnings: vec!["b".into()],
            ..ReconcileReport::default()
        });
        assert_eq!(left.cards_seen, 4);
        assert_eq!(left.created, 1);
        assert_eq!(left.unchanged, 2);
        assert_eq!(left.warnings, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn fresh_reports_start_empty_and_undeferred() {
        let report = ReconcileReport::default();
        assert!(!report.deferred);
        assert_eq!(report.cards_seen, 0);
        assert!(report.warnings.is_empty());
    }
}
