//! The only code that mutates an account balance. Card-funded transactions
//! never pass through here; their effect is deferred to settlement.

use super::account::Account;
use super::money::round_cents;
use super::transaction::Transaction;

/// Applies a transaction's signed effect: income adds, expense subtracts.
pub fn apply_transaction(account: &mut Account, transaction: &Transaction) {
    account.balance = round_cents(account.balance + transaction.signed_amount());
}

/// Exact inverse of [`apply_transaction`], used when a transaction is
/// deleted or its applied effect edited.
pub fn revert_transaction(account: &mut Account, transaction: &Transaction) {
    account.balance = round_cents(account.balance - transaction.signed_amount());
}
