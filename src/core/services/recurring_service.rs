use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use super::TransactionService;
use crate::errors::{FinanceError, Result};
use crate::ledger::{materialize_due, FundingSource, RecurringExpense};
use crate::storage::FinanceStore;

/// Recurring expense templates and their materialization into the ledger.
pub struct RecurringService;

impl RecurringService {
    pub fn add(store: &dyn FinanceStore, template: RecurringExpense) -> Result<Uuid> {
        template.validate()?;
        match template.funding {
            FundingSource::Account(id) => {
                store.account(id)?;
            }
            FundingSource::Card(id) => {
                store.card(id)?;
            }
        }
        let id = template.id;
        store.put_recurring(template)?;
        Ok(id)
    }

    /// Stores a Scheduled transaction for every occurrence due by `today`
    /// and advances each template's `last_generated` mark, so running this
    /// again on the same day creates nothing new.
    pub fn materialize(store: &dyn FinanceStore, today: NaiveDate) -> Result<Vec<Uuid>> {
        let templates = store.recurring_expenses()?;
        let created = materialize_due(&templates, today);
        let mut high_water: HashMap<Uuid, NaiveDate> = HashMap::new();
        let mut ids = Vec::with_capacity(created.len());
        for tx in created {
            if let Some(template_id) = tx.recurring_id {
                let mark = high_water.entry(template_id).or_insert(tx.date);
                if tx.date > *mark {
                    *mark = tx.date;
                }
            }
            ids.push(TransactionService::add(store, tx)?);
        }
        for mut template in templates {
            if let Some(mark) = high_water.get(&template.id) {
                template.last_generated = Some(*mark);
                store.put_recurring(template)?;
            }
        }
        if !ids.is_empty() {
            info!(count = ids.len(), "materialized recurring occurrences");
        }
        Ok(ids)
    }

    pub fn set_active(store: &dyn FinanceStore, id: Uuid, active: bool) -> Result<()> {
        let mut templates = store.recurring_expenses()?;
        let template = templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| FinanceError::Validation(format!("recurring template {id} not found")))?;
        template.active = active;
        store.put_recurring(template.clone())
    }

    pub fn list(store: &dyn FinanceStore) -> Result<Vec<RecurringExpense>> {
        store.recurring_expenses()
    }
}
