use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::period::PeriodKey;

/// One card statement: the aggregated amount a card owes for one billing
/// period. Created lazily by reconciliation, recomputed while unpaid,
/// immutable once paid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: Uuid,
    pub card_id: Uuid,
    pub period: PeriodKey,
    pub total_amount: f64,
    pub closing_date: NaiveDate,
    pub due_date: NaiveDate,
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
}

impl Invoice {
    pub fn new(
        card_id: Uuid,
        period: PeriodKey,
        total_amount: f64,
        closing_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            period,
            total_amount,
            closing_date,
            due_date,
            paid: false,
            paid_date: None,
        }
    }

    pub fn mark_paid(&mut self, on: NaiveDate) {
        self.paid = true;
        self.paid_date = Some(on);
    }

    /// Derives the display status from the stored `paid` flag and the two
    /// anchor dates. Paid wins over every date-based state.
    pub fn status(&self, today: NaiveDate) -> InvoiceStatus {
        if self.paid {
            InvoiceStatus::Paid
        } else if today > self.due_date {
            InvoiceStatus::Overdue
        } else if today > self.closing_date {
            InvoiceStatus::Closed
        } else {
            InvoiceStatus::Open
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvoiceStatus {
    /// Still collecting transactions.
    Open,
    /// Past closing, awaiting payment.
    Closed,
    /// Past due and unpaid.
    Overdue,
    Paid,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceStatus::Open => "open",
            InvoiceStatus::Closed => "closed",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Paid => "paid",
        };
        write!(f, "{label}")
    }
}
