//! Statement payment: one logical unit that marks the invoice paid, debits
//! the paying account, and records the payment transaction.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::info;
use uuid::Uuid;

use crate::errors::{FinanceError, Result};
use crate::ledger::{
    balance, Account, FundingSource, Invoice, Transaction, TransactionKind,
    CARD_PAYMENT_CATEGORY, SETTLEMENT_TAG,
};
use crate::storage::FinanceStore;
use crate::time::Clock;

/// What a successful settlement wrote.
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    pub invoice: Invoice,
    pub account: Account,
    pub payment: Transaction,
}

pub struct SettlementProcessor {
    store: Arc<dyn FinanceStore>,
    clock: Arc<dyn Clock>,
    in_flight: Mutex<HashSet<Uuid>>,
}

impl SettlementProcessor {
    pub fn new(store: Arc<dyn FinanceStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Pays an invoice from the given account.
    ///
    /// Settlements serialize per invoice id: a second call while one is in
    /// flight fails immediately instead of double-debiting. All validation
    /// happens before the first write; the three writes go invoice, then
    /// account, then transaction, and a failure rolls the earlier writes
    /// back so observable state is unchanged.
    pub fn settle(&self, invoice_id: Uuid, paying_account_id: Uuid) -> Result<SettlementOutcome> {
        let _slot = InFlightSlot::claim(&self.in_flight, invoice_id)?;

        let invoice = self.store.invoice(invoice_id)?;
        if invoice.paid {
            return Err(FinanceError::Validation(format!(
                "invoice {} is already paid",
                invoice.id
            )));
        }
        if invoice.total_amount <= 0.0 {
            return Err(FinanceError::Validation(format!(
                "invoice {} has nothing to settle",
                invoice.id
            )));
        }
        let card = self.store.card(invoice.card_id)?;
        let account = self.store.account(paying_account_id)?;
        if account.balance < invoice.total_amount {
            return Err(FinanceError::InsufficientFunds {
                balance: account.balance,
                required: invoice.total_amount,
            });
        }

        let today = self.clock.today();
        let mut paid_invoice = invoice.clone();
        paid_invoice.mark_paid(today);

        let payment = Transaction::new(
            format!("{} statement {}", card.name, invoice.period),
            invoice.total_amount,
            today,
            CARD_PAYMENT_CATEGORY,
            TransactionKind::Expense,
            FundingSource::Account(account.id),
        )
        .with_tag(SETTLEMENT_TAG);

        let mut debited = account.clone();
        balance::apply_transaction(&mut debited, &payment);

        self.store.put_invoice(paid_invoice.clone())?;
        if let Err(err) = self.store.put_account(debited.clone()) {
            let _ = self.store.put_invoice(invoice);
            return Err(err);
        }
        if let Err(err) = self.store.put_transaction(payment.clone()) {
            let _ = self.store.put_account(account);
            let _ = self.store.put_invoice(invoice);
            return Err(err);
        }

        info!(
            card = %card.name,
            period = %paid_invoice.period,
            amount = paid_invoice.total_amount,
            account = %debited.name,
            "invoice settled"
        );
        Ok(SettlementOutcome {
            invoice: paid_invoice,
            account: debited,
            payment,
        })
    }
}

/// Per-invoice exclusivity claim, released on drop.
struct InFlightSlot<'a> {
    set: &'a Mutex<HashSet<Uuid>>,
    id: Uuid,
}

impl<'a> InFlightSlot<'a> {
    fn claim(set: &'a Mutex<HashSet<Uuid>>, id: Uuid) -> Result<Self> {
        let mut guard = set.lock().expect("in-flight lock poisoned");
        if !guard.insert(id) {
            return Err(FinanceError::Validation(format!(
                "a settlement for invoice {id} is already in progress"
            )));
        }
        Ok(Self { set, id })
    }
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.set.lock() {
            guard.remove(&self.id);
        }
    }
}
