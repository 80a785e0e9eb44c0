//! Expansion of a deferred card purchase into monthly installment
//! occurrences.

use uuid::Uuid;

use super::dates::add_months;
use super::money::round_cents;
use super::transaction::{InstallmentInfo, Transaction, TransactionStatus};
use crate::errors::{FinanceError, Result};

pub const MIN_INSTALLMENTS: u32 = 2;
pub const MAX_INSTALLMENTS: u32 = 24;

/// Splits a card purchase into `count` monthly occurrences. Occurrence `i`
/// keeps the purchase's day-of-month `i` months later (clamped in shorter
/// months), its description gains an `(i/count)` suffix, and its share is
/// the cent-rounded even split with the final share absorbing the rounding
/// remainder so the shares sum back to the purchase amount exactly.
///
/// The first occurrence keeps the purchase's id and status; later ones are
/// new `Scheduled` transactions. Expansion applies to whole purchases only,
/// never to an occurrence of an earlier split.
pub fn expand_purchase(purchase: &Transaction, count: u32) -> Result<Vec<Transaction>> {
    if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&count) {
        return Err(FinanceError::Validation(format!(
            "installment count {count} outside {MIN_INSTALLMENTS}..={MAX_INSTALLMENTS}"
        )));
    }
    purchase.validate()?;
    if !purchase.is_card_funded() {
        return Err(FinanceError::Validation(
            "only card purchases can be paid in installments".into(),
        ));
    }
    if purchase.installment.is_some() {
        return Err(FinanceError::Validation(
            "transaction is already an installment occurrence".into(),
        ));
    }

    let share = round_cents(purchase.amount / count as f64);
    let last_share = round_cents(purchase.amount - share * (count - 1) as f64);

    let mut occurrences = Vec::with_capacity(count as usize);
    for index in 0..count {
        let mut occurrence = purchase.clone();
        if index > 0 {
            occurrence.id = Uuid::new_v4();
            occurrence.status = TransactionStatus::Scheduled;
        }
        occurrence.date = add_months(purchase.date, index as i32);
        occurrence.description = format!("{} ({}/{count})", purchase.description, index + 1);
        occurrence.installment = Some(InstallmentInfo {
            installment_index: index + 1,
            total_installments: count,
            per_installment_amount: if index + 1 == count { last_share } else { share },
        });
        occurrences.push(occurrence);
    }
    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::{FundingSource, TransactionKind};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn purchase(amount: f64, on: NaiveDate) -> Transaction {
        Transaction::new(
            "Television",
            amount,
            on,
            "electronics",
            TransactionKind::Expense,
            FundingSource::Card(Uuid::new_v4()),
        )
    }

    #[test]
    fn splits_evenly_preserving_month_end_dates() {
        let occurrences = expand_purchase(&purchase(1200.0, date(2024, 1, 31)), 3).unwrap();

        let dates: Vec<NaiveDate> = occurrences.iter().map(|tx| tx.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31)]
        );
        for tx in &occurrences {
            let info = tx.installment.as_ref().unwrap();
            assert_eq!(info.per_installment_amount, 400.0);
            assert_eq!(info.total_installments, 3);
        }
        assert_eq!(occurrences[0].description, "Television (1/3)");
        assert_eq!(occurrences[2].description, "Television (3/3)");
    }

    #[test]
    fn last_share_absorbs_the_rounding_remainder() {
        let occurrences = expand_purchase(&purchase(100.0, date(2024, 5, 10)), 3).unwrap();
        let shares: Vec<f64> = occurrences
            .iter()
            .map(|tx| tx.installment.as_ref().unwrap().per_installment_amount)
            .collect();
        assert_eq!(shares, vec![33.33, 33.33, 33.34]);
        assert_eq!(round_cents(shares.iter().sum()), 100.0);
    }

    #[test]
    fn preserves_day_of_month_across_months() {
        let occurrences = expand_purchase(&purchase(240.0, date(2024, 1, 15)), 4).unwrap();
        let dates: Vec<NaiveDate> = occurrences.iter().map(|tx| tx.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 15),
                date(2024, 2, 15),
                date(2024, 3, 15),
                date(2024, 4, 15),
            ]
        );
    }

    #[test]
    fn first_occurrence_keeps_the_purchase_identity() {
        let original = purchase(600.0, date(2024, 3, 5));
        let occurrences = expand_purchase(&original, 2).unwrap();
        assert_eq!(occurrences[0].id, original.id);
        assert_eq!(occurrences[0].status, TransactionStatus::Confirmed);
        assert_ne!(occurrences[1].id, original.id);
        assert_eq!(occurrences[1].status, TransactionStatus::Scheduled);
    }

    #[test]
    fn enforces_count_bounds() {
        let tv = purchase(600.0, date(2024, 3, 5));
        assert!(expand_purchase(&tv, 1).is_err());
        assert!(expand_purchase(&tv, 25).is_err());
        assert!(expand_purchase(&tv, MIN_INSTALLMENTS).is_ok());
        assert!(expand_purchase(&tv, MAX_INSTALLMENTS).is_ok());
    }

    #[test]
    fn rejects_non_card_purchases_and_re_expansion() {
        let from_account = Transaction::new(
            "Rent",
            900.0,
            date(2024, 3, 1),
            "housing",
            TransactionKind::Expense,
            FundingSource::Account(Uuid::new_v4()),
        );
        assert!(expand_purchase(&from_account, 3).is_err());

        let once = expand_purchase(&purchase(600.0, date(2024, 3, 5)), 2).unwrap();
        assert!(expand_purchase(&once[0], 2).is_err());
    }
}
