//! Domain models and the pure billing math they build on.

pub mod account;
pub mod balance;
pub mod billing;
pub mod book;
pub mod budget;
pub mod card;
pub mod dates;
pub mod goal;
pub mod installment;
pub mod invoice;
pub mod money;
pub mod period;
pub mod recurring;
pub mod transaction;

pub use account::{Account, AccountKind};
pub use billing::{classify_transaction_date, current_cycle, cycle_for_period, BillingCycle};
pub use book::Book;
pub use budget::CategoryBudget;
pub use card::Card;
pub use goal::SavingsGoal;
pub use installment::{expand_purchase, MAX_INSTALLMENTS, MIN_INSTALLMENTS};
pub use invoice::{Invoice, InvoiceStatus};
pub use period::{PeriodKey, PeriodKeyError};
pub use recurring::{materialize_due, RecurringExpense};
pub use transaction::{
    FundingSource, InstallmentInfo, Transaction, TransactionKind, TransactionStatus,
    CARD_PAYMENT_CATEGORY, SETTLEMENT_TAG,
};
