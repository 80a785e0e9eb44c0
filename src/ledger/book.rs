use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    account::Account, budget::CategoryBudget, card::Card, goal::SavingsGoal, invoice::Invoice,
    period::PeriodKey, recurring::RecurringExpense, transaction::Transaction,
};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The whole document a storage backend persists: every collection plus
/// bookkeeping timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub recurring: Vec<RecurringExpense>,
    #[serde(default)]
    pub goals: Vec<SavingsGoal>,
    #[serde(default)]
    pub budgets: Vec<CategoryBudget>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Book::schema_version_default")]
    pub schema_version: u8,
}

impl Book {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            accounts: Vec::new(),
            cards: Vec::new(),
            transactions: Vec::new(),
            invoices: Vec::new(),
            recurring: Vec::new(),
            goals: Vec::new(),
            budgets: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        self.touch();
        id
    }

    pub fn add_card(&mut self, card: Card) -> Uuid {
        let id = card.id;
        self.cards.push(card);
        self.touch();
        id
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn add_invoice(&mut self, invoice: Invoice) -> Uuid {
        let id = invoice.id;
        self.invoices.push(invoice);
        self.touch();
        id
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn account_mut(&mut self, id: Uuid) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    pub fn card(&self, id: Uuid) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    pub fn invoice(&self, id: Uuid) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.id == id)
    }

    /// At most one invoice exists per (card, period); this is the lookup the
    /// reconcile engine and the stores are built around.
    pub fn invoice_for(&self, card_id: Uuid, period: PeriodKey) -> Option<&Invoice> {
        self.invoices
            .iter()
            .find(|invoice| invoice.card_id == card_id && invoice.period == period)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
