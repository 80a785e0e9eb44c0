//! Business logic for transactions, including the balance side effects
//! account-funded entries carry.

use uuid::Uuid;

use crate::errors::{FinanceError, Result};
use crate::ledger::{balance, installment::expand_purchase, Transaction, TransactionStatus};
use crate::storage::FinanceStore;

/// Validated CRUD helpers for transactions.
///
/// Balance rules: only a Confirmed, account-funded transaction moves its
/// account's balance. Card-funded spending waits for settlement; Scheduled
/// entries wait for [`TransactionService::confirm`].
pub struct TransactionService;

impl TransactionService {
    pub fn add(store: &dyn FinanceStore, transaction: Transaction) -> Result<Uuid> {
        transaction.validate()?;
        Self::check_funding(store, &transaction)?;
        let id = transaction.id;
        match Self::balance_target(&transaction) {
            Some(account_id) => {
                let previous = store.account(account_id)?;
                let mut updated = previous.clone();
                balance::apply_transaction(&mut updated, &transaction);
                store.put_account(updated)?;
                if let Err(err) = store.put_transaction(transaction) {
                    let _ = store.put_account(previous);
                    return Err(err);
                }
            }
            None => store.put_transaction(transaction)?,
        }
        Ok(id)
    }

    /// Expands a card purchase into installment occurrences and stores them
    /// all. The draft itself is never stored; the first occurrence takes its
    /// place and keeps its id.
    pub fn add_installments(
        store: &dyn FinanceStore,
        purchase: &Transaction,
        count: u32,
    ) -> Result<Vec<Uuid>> {
        Self::check_funding(store, purchase)?;
        let occurrences = expand_purchase(purchase, count)?;
        let mut ids = Vec::with_capacity(occurrences.len());
        for occurrence in occurrences {
            ids.push(occurrence.id);
            store.put_transaction(occurrence)?;
        }
        Ok(ids)
    }

    /// Marks a Scheduled transaction performed, applying its balance effect
    /// if it is account-funded.
    pub fn confirm(store: &dyn FinanceStore, id: Uuid) -> Result<()> {
        let mut transaction = store.transaction(id)?;
        if transaction.status == TransactionStatus::Confirmed {
            return Err(FinanceError::Validation(format!(
                "transaction {id} is already confirmed"
            )));
        }
        transaction.status = TransactionStatus::Confirmed;
        match Self::balance_target(&transaction) {
            Some(account_id) => {
                let previous = store.account(account_id)?;
                let mut updated = previous.clone();
                balance::apply_transaction(&mut updated, &transaction);
                store.put_account(updated)?;
                if let Err(err) = store.put_transaction(transaction) {
                    let _ = store.put_account(previous);
                    return Err(err);
                }
                Ok(())
            }
            None => store.put_transaction(transaction),
        }
    }

    /// Updates the transaction identified by `id` via the provided mutator,
    /// fixing up the account balance when the applied effect changed.
    pub fn update<F>(store: &dyn FinanceStore, id: Uuid, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut Transaction),
    {
        let original = store.transaction(id)?;
        if original.is_settlement() {
            return Err(FinanceError::Validation(
                "settlement records are immutable".into(),
            ));
        }
        let mut updated = original.clone();
        mutator(&mut updated);
        if updated.id != original.id {
            return Err(FinanceError::Validation(
                "transaction id cannot change".into(),
            ));
        }
        if updated.account_id != original.account_id || updated.card_id != original.card_id {
            return Err(FinanceError::Validation(
                "transactions keep their funding source for life".into(),
            ));
        }
        updated.validate()?;

        let was_applied = Self::balance_target(&original);
        let now_applies = Self::balance_target(&updated);
        let account_id = match (was_applied, now_applies) {
            (None, None) => return store.put_transaction(updated),
            (Some(id), _) | (None, Some(id)) => id,
        };
        let previous = store.account(account_id)?;
        let mut adjusted = previous.clone();
        if was_applied.is_some() {
            balance::revert_transaction(&mut adjusted, &original);
        }
        if now_applies.is_some() {
            balance::apply_transaction(&mut adjusted, &updated);
        }
        store.put_account(adjusted)?;
        if let Err(err) = store.put_transaction(updated) {
            let _ = store.put_account(previous);
            return Err(err);
        }
        Ok(())
    }

    /// Deletes a transaction, reverting its balance effect. Settlement
    /// records refuse deletion: they are the history behind a paid invoice.
    pub fn remove(store: &dyn FinanceStore, id: Uuid) -> Result<Transaction> {
        let transaction = store.transaction(id)?;
        if transaction.is_settlement() {
            return Err(FinanceError::Validation(
                "settlement records are immutable".into(),
            ));
        }
        match Self::balance_target(&transaction) {
            Some(account_id) => {
                let previous = store.account(account_id)?;
                let mut reverted = previous.clone();
                balance::revert_transaction(&mut reverted, &transaction);
                store.put_account(reverted)?;
                match store.remove_transaction(id) {
                    Ok(removed) => Ok(removed),
                    Err(err) => {
                        let _ = store.put_account(previous);
                        Err(err)
                    }
                }
            }
            None => store.remove_transaction(id),
        }
    }

    pub fn get(store: &dyn FinanceStore, id: Uuid) -> Result<Transaction> {
        store.transaction(id)
    }

    pub fn list(store: &dyn FinanceStore) -> Result<Vec<Transaction>> {
        store.transactions()
    }

    fn check_funding(store: &dyn FinanceStore, transaction: &Transaction) -> Result<()> {
        if let Some(account_id) = transaction.account_id {
            store.account(account_id)?;
        }
        if let Some(card_id) = transaction.card_id {
            store.card(card_id)?;
        }
        Ok(())
    }

    /// The account whose balance this transaction moves, if any.
    fn balance_target(transaction: &Transaction) -> Option<Uuid> {
        match (transaction.account_id, transaction.status) {
            (Some(account_id), TransactionStatus::Confirmed) => Some(account_id),
            _ => None,
        }
    }
}
