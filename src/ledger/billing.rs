//! Billing-cycle math for credit cards.
//!
//! A card is configured with two day-of-month anchors: the closing day, when
//! the statement's transaction window ends, and the due day, when the
//! statement must be paid. Everything here is pure calendar arithmetic; the
//! reconcile engine feeds it the reference date from its injected clock.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use super::card::Card;
use super::dates::clamped_dom;
use super::money::round_cents;
use super::period::PeriodKey;
use super::transaction::{Transaction, CARD_PAYMENT_CATEGORY};
use crate::errors::Result;

/// Boundaries of one billing period of a card. `start` and `end` are both
/// inclusive; every calendar day belongs to exactly one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingCycle {
    /// Day after the previous close.
    pub start: NaiveDate,
    /// Closing date.
    pub end: NaiveDate,
    /// Payment deadline.
    pub due: NaiveDate,
    pub period: PeriodKey,
}

/// Computes the cycle the reference date falls into. A reference on the
/// closing day itself still belongs to the closing cycle; the day after
/// opens the next one.
pub fn current_cycle(card: &Card, reference: NaiveDate) -> Result<BillingCycle> {
    card.validate()?;
    let close = if reference.day() <= card.closing_day {
        PeriodKey::from_date(reference)
    } else {
        PeriodKey::from_date(reference).next()
    };
    Ok(cycle_for_period(card, close))
}

/// Cycle boundaries for an explicit period. Anchors are clamped to each
/// month's length, so closing day 31 closes February on the 28th/29th;
/// defining the start as the previous close plus one day keeps consecutive
/// cycles gapless under that clamping. A due day earlier than the closing
/// day lands in the month after the close.
pub fn cycle_for_period(card: &Card, period: PeriodKey) -> BillingCycle {
    let end = clamped_dom(period.year(), period.month(), card.closing_day);
    let prev = period.prev();
    let prev_close = clamped_dom(prev.year(), prev.month(), card.closing_day);
    let start = prev_close.succ_opt().expect("close date is never at the calendar bound");
    let due_period = if card.due_day < card.closing_day {
        period.next()
    } else {
        period
    };
    let due = clamped_dom(due_period.year(), due_period.month(), card.due_day);
    BillingCycle {
        start,
        end,
        due,
        period,
    }
}

/// Maps a transaction date to the statement period it bills into: on or
/// before the closing day bills the date's own month, after it the next.
pub fn classify_transaction_date(date: NaiveDate, closing_day: u32) -> PeriodKey {
    if date.day() <= closing_day {
        PeriodKey::from_date(date)
    } else {
        PeriodKey::from_date(date).next()
    }
}

/// Statement total for one cycle: the card's transactions dated inside the
/// window, each contributing its billed amount. The reserved card-payment
/// category is excluded so settlements never feed the next statement.
pub fn cycle_total(card_id: Uuid, cycle: &BillingCycle, transactions: &[Transaction]) -> f64 {
    let sum: f64 = transactions
        .iter()
        .filter(|tx| tx.card_id == Some(card_id))
        .filter(|tx| tx.category != CARD_PAYMENT_CATEGORY)
        .filter(|tx| tx.date >= cycle.start && tx.date <= cycle.end)
        .map(Transaction::billed_amount)
        .sum();
    round_cents(sum)
}
