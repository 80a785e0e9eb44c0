use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Passive monthly spending cap for one category label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryBudget {
    pub id: Uuid,
    pub category: String,
    pub monthly_limit: f64,
}

impl CategoryBudget {
    pub fn new(category: impl Into<String>, monthly_limit: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            monthly_limit,
        }
    }
}
