use std::result::Result as StdResult;

use thiserror::Error;
use uuid::Uuid;

use crate::ledger::PeriodKey;

/// Unified error type for domain, engine, and storage layers.
#[derive(Error, Debug)]
pub enum FinanceError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Card not found: {0}")]
    CardNotFound(Uuid),
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Insufficient funds: balance {balance:.2} is below invoice total {required:.2}")]
    InsufficientFunds { balance: f64, required: f64 },
    #[error("Invoice already exists for card {card_id} in period {period}")]
    DuplicateInvoice { card_id: Uuid, period: PeriodKey },
    #[error("Persistence error: {0}")]
    Storage(String),
}

pub type Result<T> = StdResult<T, FinanceError>;

impl From<std::io::Error> for FinanceError {
    fn from(err: std::io::Error) -> Self {
        FinanceError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for FinanceError {
    fn from(err: serde_json::Error) -> Self {
        FinanceError::Storage(err.to_string())
    }
}
