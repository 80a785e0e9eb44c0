//! Recurring expense templates and their materialization into scheduled
//! transactions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dates::add_months;
use super::transaction::{FundingSource, Transaction, TransactionKind, TransactionStatus};
use crate::errors::{FinanceError, Result};

const MAX_MATERIALIZED_OCCURRENCES: usize = 1024;

/// Template for an expense repeating every `interval_months` months from
/// `start_date`. `last_generated` is the high-water mark of occurrences
/// already turned into transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringExpense {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub funding: FundingSource,
    pub start_date: NaiveDate,
    pub interval_months: u32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub last_generated: Option<NaiveDate>,
}

fn default_active() -> bool {
    true
}

impl RecurringExpense {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        funding: FundingSource,
        start_date: NaiveDate,
        interval_months: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
            category: category.into(),
            funding,
            start_date,
            interval_months,
            active: true,
            last_generated: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FinanceError::Validation(
                "recurring expense name is empty".into(),
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(FinanceError::Validation(format!(
                "recurring amount {} is not a positive number",
                self.amount
            )));
        }
        if self.interval_months == 0 {
            return Err(FinanceError::Validation(
                "recurring interval must be at least one month".into(),
            ));
        }
        Ok(())
    }

    /// Occurrence dates due on or before `reference` and past the
    /// `last_generated` mark. Occurrences are anchored at `start_date`
    /// (occurrence k falls `k * interval_months` months later), so the
    /// day-of-month survives intervening short months.
    pub fn due_dates(&self, reference: NaiveDate) -> Vec<NaiveDate> {
        let mut due = Vec::new();
        if !self.active {
            return due;
        }
        for step in 0..MAX_MATERIALIZED_OCCURRENCES {
            let date = add_months(self.start_date, step as i32 * self.interval_months as i32);
            if date > reference {
                break;
            }
            if self.last_generated.map_or(true, |mark| date > mark) {
                due.push(date);
            }
        }
        due
    }
}

/// Builds scheduled transactions for every active template occurrence due on
/// or before the reference date. The returned transactions are detached from
/// their templates, linked back only by `recurring_id`, so they are ready
/// for persistence; the caller advances each template's `last_generated`.
pub fn materialize_due(templates: &[RecurringExpense], reference: NaiveDate) -> Vec<Transaction> {
    let mut creations = Vec::new();
    for template in templates {
        for date in template.due_dates(reference) {
            let mut tx = Transaction::new(
                template.name.clone(),
                template.amount,
                date,
                template.category.clone(),
                TransactionKind::Expense,
                template.funding,
            )
            .with_status(TransactionStatus::Scheduled);
            tx.recurring_id = Some(template.id);
            creations.push(tx);
            if creations.len() >= MAX_MATERIALIZED_OCCURRENCES {
                return creations;
            }
        }
    }
    creations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(start: NaiveDate) -> RecurringExpense {
        RecurringExpense::new(
            "Gym",
            39.9,
            "health",
            FundingSource::Card(Uuid::new_v4()),
            start,
            1,
        )
    }

    #[test]
    fn anchoring_preserves_the_day_of_month() {
        let template = monthly(date(2024, 1, 31));
        assert_eq!(
            template.due_dates(date(2024, 3, 31)),
            vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31)]
        );
    }

    #[test]
    fn last_generated_is_a_high_water_mark() {
        let mut template = monthly(date(2024, 1, 10));
        template.last_generated = Some(date(2024, 2, 10));
        assert_eq!(template.due_dates(date(2024, 3, 15)), vec![date(2024, 3, 10)]);
        template.last_generated = Some(date(2024, 3, 10));
        assert!(template.due_dates(date(2024, 3, 15)).is_empty());
    }

    #[test]
    fn inactive_templates_generate_nothing() {
        let mut template = monthly(date(2024, 1, 10));
        template.active = false;
        assert!(template.due_dates(date(2024, 6, 1)).is_empty());
    }

    #[test]
    fn quarterly_intervals_step_three_months() {
        let mut template = monthly(date(2024, 1, 15));
        template.interval_months = 3;
        assert_eq!(
            template.due_dates(date(2024, 8, 1)),
            vec![date(2024, 1, 15), date(2024, 4, 15), date(2024, 7, 15)]
        );
    }

    #[test]
    fn materialized_occurrences_are_scheduled_and_linked() {
        let template = monthly(date(2024, 2, 5));
        let created = materialize_due(&[template.clone()], date(2024, 3, 5));
        assert_eq!(created.len(), 2);
        for tx in &created {
            assert_eq!(tx.status, TransactionStatus::Scheduled);
            assert_eq!(tx.recurring_id, Some(template.id));
            assert_eq!(tx.kind, TransactionKind::Expense);
            assert_eq!(tx.amount, 39.9);
            assert!(tx.validate().is_ok());
        }
    }

    #[test]
    fn rejects_degenerate_templates() {
        let mut template = monthly(date(2024, 1, 1));
        template.interval_months = 0;
        assert!(template.validate().is_err());
        template.interval_months = 1;
        template.amount = -1.0;
        assert!(template.validate().is_err());
    }
}
