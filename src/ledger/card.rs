use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FinanceError, Result};

/// A credit card with the two day-of-month anchors that drive its billing cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub limit: f64,
    /// Day of month the statement transaction window ends (1..=31).
    pub closing_day: u32,
    /// Day of month the statement must be paid by (1..=31).
    pub due_day: u32,
    /// Account debited when a statement is settled, when one is linked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
}

impl Card {
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        limit: f64,
        closing_day: u32,
        due_day: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            brand: brand.into(),
            limit,
            closing_day,
            due_day,
            account_id: None,
        }
    }

    /// Links the account debited by settlements.
    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Checks the day anchors are usable calendar-of-month values.
    pub fn validate(&self) -> Result<()> {
        if !(1..=31).contains(&self.closing_day) {
            return Err(FinanceError::Validation(format!(
                "card `{}` has closing day {} outside 1..=31",
                self.name, self.closing_day
            )));
        }
        if !(1..=31).contains(&self.due_day) {
            return Err(FinanceError::Validation(format!(
                "card `{}` has due day {} outside 1..=31",
                self.name, self.due_day
            )));
        }
        Ok(())
    }
}
