use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bank account whose balance funds transactions and card settlements.
///
/// The balance is only ever mutated through [`crate::ledger::balance`] so the
/// signed effect of every transaction is applied exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub institution: String,
    #[serde(default)]
    pub routing_number: String,
    #[serde(default)]
    pub account_number: String,
    pub kind: AccountKind,
    pub balance: f64,
}

impl Account {
    /// Creates a new account with a zero balance.
    pub fn new(name: impl Into<String>, institution: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            institution: institution.into(),
            routing_number: String::new(),
            account_number: String::new(),
            kind,
            balance: 0.0,
        }
    }

    /// Sets the routing/account number pair.
    pub fn with_numbers(
        mut self,
        routing_number: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        self.routing_number = routing_number.into();
        self.account_number = account_number.into();
        self
    }

    /// Sets the opening balance.
    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }
}

/// Supported account classifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountKind {
    Checking,
    Savings,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountKind::Checking => "Checking",
            AccountKind::Savings => "Savings",
        };
        f.write_str(label)
    }
}
