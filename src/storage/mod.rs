pub mod json_backend;
pub mod memory;

use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use crate::errors::Result;
use crate::ledger::{Account, Book, Card, Invoice, PeriodKey, RecurringExpense, Transaction};

/// Which collection changed. Invoice and account writes are deliberately
/// silent: the reconcile engine writes invoices itself and must not
/// re-trigger on its own output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    Transactions,
    Cards,
}

pub type ChangeListener = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

/// Publish side of the store: mutations to transactions and cards fan out to
/// every subscriber, after the store's internal locks are released. Delivery
/// is at-least-once; subscribers must tolerate redundant calls.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, listener: ChangeListener);
}

pub trait TransactionStore: Send + Sync {
    fn transactions(&self) -> Result<Vec<Transaction>>;
    fn transaction(&self, id: Uuid) -> Result<Transaction>;
    /// Upsert by id.
    fn put_transaction(&self, transaction: Transaction) -> Result<()>;
    /// Removes and returns the transaction. Business rules about what may be
    /// deleted live in the services; stores remove unconditionally.
    fn remove_transaction(&self, id: Uuid) -> Result<Transaction>;
}

pub trait CardStore: Send + Sync {
    fn cards(&self) -> Result<Vec<Card>>;
    fn card(&self, id: Uuid) -> Result<Card>;
    fn put_card(&self, card: Card) -> Result<()>;
}

pub trait AccountStore: Send + Sync {
    fn accounts(&self) -> Result<Vec<Account>>;
    fn account(&self, id: Uuid) -> Result<Account>;
    fn put_account(&self, account: Account) -> Result<()>;
}

pub trait InvoiceStore: Send + Sync {
    fn invoices(&self) -> Result<Vec<Invoice>>;
    fn invoice(&self, id: Uuid) -> Result<Invoice>;
    fn invoice_for(&self, card_id: Uuid, period: PeriodKey) -> Result<Option<Invoice>>;
    /// Upsert by id.
    fn put_invoice(&self, invoice: Invoice) -> Result<()>;
    /// Atomic compare-and-create on (card_id, period): fails with
    /// `DuplicateInvoice` when a concurrent writer got there first, leaving
    /// the existing invoice untouched.
    fn insert_new_invoice(&self, invoice: Invoice) -> Result<()>;
}

pub trait RecurringStore: Send + Sync {
    fn recurring_expenses(&self) -> Result<Vec<RecurringExpense>>;
    fn put_recurring(&self, template: RecurringExpense) -> Result<()>;
}

/// Everything the engines and services need from one store value.
pub trait FinanceStore:
    TransactionStore + CardStore + AccountStore + InvoiceStore + RecurringStore + ChangeFeed
{
}

impl<T> FinanceStore for T where
    T: TransactionStore + CardStore + AccountStore + InvoiceStore + RecurringStore + ChangeFeed
{
}

/// Abstraction over persistence backends capable of storing books and their
/// backup snapshots.
pub trait StorageBackend: Send + Sync {
    fn save(&self, book: &Book, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<Book>;
    fn list_books(&self) -> Result<Vec<String>>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn backup(&self, book: &Book, name: &str, note: Option<&str>) -> Result<()>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Book>;

    /// Optional helpers for ad-hoc file operations. Defaults route through
    /// the plain JSON file helpers.
    fn save_to_path(&self, book: &Book, path: &Path) -> Result<()> {
        json_backend::save_book_to_path(book, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Book> {
        json_backend::load_book_from_path(path)
    }
}

pub use json_backend::{book_warnings, JsonStorage};
pub use memory::MemoryStore;
