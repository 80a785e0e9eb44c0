use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FinanceError, Result};

/// Category reserved for the transaction a settlement records. Transactions in
/// this category never count toward an invoice total.
pub const CARD_PAYMENT_CATEGORY: &str = "card-payment";

/// Tag marking settlement transactions as immutable history.
pub const SETTLEMENT_TAG: &str = "settlement";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TransactionStatus {
    #[default]
    Confirmed,
    /// Not yet performed, e.g. a future installment or a materialized
    /// recurring occurrence.
    Scheduled,
}

/// Where the money moves: a transaction is funded by exactly one account or
/// exactly one card for its whole lifetime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    Account(Uuid),
    Card(Uuid),
}

/// Installment metadata carried by each occurrence of a split purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstallmentInfo {
    /// 1-based position within the series.
    pub installment_index: u32,
    pub total_installments: u32,
    /// This occurrence's own share; the last share absorbs rounding remainder.
    pub per_installment_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub description: String,
    /// Always positive; direction comes from `kind`.
    pub amount: f64,
    pub date: NaiveDate,
    pub category: String,
    pub kind: TransactionKind,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment: Option<InstallmentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl Transaction {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        date: NaiveDate,
        category: impl Into<String>,
        kind: TransactionKind,
        funding: FundingSource,
    ) -> Self {
        let (account_id, card_id) = match funding {
            FundingSource::Account(id) => (Some(id), None),
            FundingSource::Card(id) => (None, Some(id)),
        };
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            date,
            category: category.into(),
            kind,
            status: TransactionStatus::Confirmed,
            account_id,
            card_id,
            installment: None,
            recurring_id: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_installment(mut self, info: InstallmentInfo) -> Self {
        self.installment = Some(info);
        self
    }

    pub fn funding(&self) -> Option<FundingSource> {
        match (self.account_id, self.card_id) {
            (Some(account), None) => Some(FundingSource::Account(account)),
            (None, Some(card)) => Some(FundingSource::Card(card)),
            _ => None,
        }
    }

    pub fn is_card_funded(&self) -> bool {
        matches!(self.funding(), Some(FundingSource::Card(_)))
    }

    /// Settlement records are immutable history and refuse edits/deletes.
    pub fn is_settlement(&self) -> bool {
        self.tags.contains(SETTLEMENT_TAG)
    }

    /// The amount this transaction contributes to a statement total:
    /// its own installment share when it is one occurrence of a split
    /// purchase, its full amount otherwise.
    pub fn billed_amount(&self) -> f64 {
        self.installment
            .as_ref()
            .map(|info| info.per_installment_amount)
            .unwrap_or(self.amount)
    }

    /// Effect on an account balance: income adds, expense subtracts.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(FinanceError::Validation(
                "transaction description is empty".into(),
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(FinanceError::Validation(format!(
                "transaction amount {} is not a positive number",
                self.amount
            )));
        }
        match (self.account_id, self.card_id) {
            (Some(_), Some(_)) => {
                return Err(FinanceError::Validation(
                    "transaction is funded by both an account and a card".into(),
                ))
            }
            (None, None) => {
                return Err(FinanceError::Validation(
                    "transaction has no funding source".into(),
                ))
            }
            _ => {}
        }
        if let Some(info) = &self.installment {
            if info.total_installments < 2 {
                return Err(FinanceError::Validation(format!(
                    "installment series of {} occurrences is not a split",
                    info.total_installments
                )));
            }
            if info.installment_index == 0 || info.installment_index > info.total_installments {
                return Err(FinanceError::Validation(format!(
                    "installment index {} outside 1..={}",
                    info.installment_index, info.total_installments
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn card_expense() -> Transaction {
        Transaction::new(
            "Groceries",
            82.50,
            date(2024, 3, 10),
            "food",
            TransactionKind::Expense,
            FundingSource::Card(Uuid::new_v4()),
        )
    }

    #[test]
    fn funding_is_exclusive() {
        let tx = card_expense();
        assert!(tx.validate().is_ok());
        assert!(tx.is_card_funded());

        let mut both = tx.clone();
        both.account_id = Some(Uuid::new_v4());
        assert!(both.validate().is_err());

        let mut neither = tx;
        neither.card_id = None;
        assert!(neither.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let mut tx = card_expense();
        tx.amount = 0.0;
        assert!(tx.validate().is_err());
        tx.amount = -5.0;
        assert!(tx.validate().is_err());
        tx.amount = f64::NAN;
        assert!(tx.validate().is_err());
    }

    #[test]
    fn billed_amount_prefers_installment_share() {
        let tx = card_expense();
        assert_eq!(tx.billed_amount(), 82.50);

        let split = tx.with_installment(InstallmentInfo {
            installment_index: 1,
            total_installments: 3,
            per_installment_amount: 27.50,
        });
        assert_eq!(split.billed_amount(), 27.50);
    }

    #[test]
    fn signed_amount_follows_kind() {
        let expense = card_expense();
        assert_eq!(expense.signed_amount(), -82.50);

        let income = Transaction::new(
            "Salary",
            1800.0,
            date(2024, 3, 1),
            "salary",
            TransactionKind::Income,
            FundingSource::Account(Uuid::new_v4()),
        );
        assert_eq!(income.signed_amount(), 1800.0);
    }

    #[test]
    fn settlement_tag_marks_immutable_history() {
        let tx = card_expense();
        assert!(!tx.is_settlement());
        assert!(tx.with_tag(SETTLEMENT_TAG).is_settlement());
    }

    #[test]
    fn installment_metadata_bounds() {
        let base = card_expense();
        let bad_total = base.clone().with_installment(InstallmentInfo {
            installment_index: 1,
            total_installments: 1,
            per_installment_amount: 82.50,
        });
        assert!(bad_total.validate().is_err());

        let bad_index = base.with_installment(InstallmentInfo {
            installment_index: 4,
            total_installments: 3,
            per_installment_amount: 27.50,
        });
        assert!(bad_index.validate().is_err());
    }
}
