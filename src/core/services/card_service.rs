use uuid::Uuid;

use crate::errors::{FinanceError, Result};
use crate::ledger::Card;
use crate::storage::FinanceStore;

/// Validated CRUD helpers for credit cards.
pub struct CardService;

impl CardService {
    /// Adds a card after checking its day anchors and, when present, the
    /// linked settlement account. Storing a card wakes the reconcile engine,
    /// which lazily creates the card's current invoice.
    pub fn add(store: &dyn FinanceStore, card: Card) -> Result<Uuid> {
        card.validate()?;
        Self::validate_name(store, None, &card.name)?;
        if let Some(account_id) = card.account_id {
            store.account(account_id)?;
        }
        let id = card.id;
        store.put_card(card)?;
        Ok(id)
    }

    pub fn edit(store: &dyn FinanceStore, id: Uuid, changes: Card) -> Result<()> {
        changes.validate()?;
        Self::validate_name(store, Some(id), &changes.name)?;
        if let Some(account_id) = changes.account_id {
            store.account(account_id)?;
        }
        let mut card = store.card(id)?;
        card.name = changes.name;
        card.brand = changes.brand;
        card.limit = changes.limit;
        card.closing_day = changes.closing_day;
        card.due_day = changes.due_day;
        card.account_id = changes.account_id;
        store.put_card(card)
    }

    pub fn list(store: &dyn FinanceStore) -> Result<Vec<Card>> {
        store.cards()
    }

    fn validate_name(
        store: &dyn FinanceStore,
        exclude: Option<Uuid>,
        candidate: &str,
    ) -> Result<()> {
        if candidate.trim().is_empty() {
            return Err(FinanceError::Validation("card name is empty".into()));
        }
        let normalized = candidate.trim().to_ascii_lowercase();
        let duplicate = store.cards()?.iter().any(|card| {
            card.name.trim().to_ascii_lowercase() == normalized
                && exclude.map_or(true, |id| card.id != id)
        });
        if duplicate {
            Err(FinanceError::Validation(format!(
                "card `{candidate}` already exists"
            )))
        } else {
            Ok(())
        }
    }
}
