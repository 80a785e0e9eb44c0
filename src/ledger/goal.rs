use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Passive savings target; progress rendering belongs to the front end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub saved_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
}

impl SavingsGoal {
    pub fn new(name: impl Into<String>, target_amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_amount,
            saved_amount: 0.0,
            target_date: None,
            account_id: None,
        }
    }
}
