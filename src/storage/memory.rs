//! In-process store over a single [`Book`], carrying the change bus the
//! reconcile engine subscribes to.

use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use super::{
    AccountStore, CardStore, ChangeEvent, ChangeFeed, ChangeListener, InvoiceStore,
    RecurringStore, TransactionStore,
};
use crate::errors::{FinanceError, Result};
use crate::ledger::{
    Account, Book, Card, CategoryBudget, Invoice, PeriodKey, RecurringExpense, SavingsGoal,
    Transaction,
};

pub struct MemoryStore {
    inner: RwLock<Book>,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_book(Book::new("in-memory"))
    }

    pub fn from_book(book: Book) -> Self {
        Self {
            inner: RwLock::new(book),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Clones the whole document, e.g. to hand to a persistence backend.
    pub fn snapshot(&self) -> Book {
        self.read().clone()
    }

    /// Swaps in a freshly loaded document and wakes every subscriber so
    /// derived state is rebuilt against the new data.
    pub fn replace(&self, book: Book) {
        *self.write() = book;
        self.notify(ChangeEvent::Cards);
        self.notify(ChangeEvent::Transactions);
    }

    pub fn goals(&self) -> Vec<SavingsGoal> {
        self.read().goals.clone()
    }

    pub fn put_goal(&self, goal: SavingsGoal) {
        let mut book = self.write();
        match book.goals.iter_mut().find(|g| g.id == goal.id) {
            Some(slot) => *slot = goal,
            None => book.goals.push(goal),
        }
        book.touch();
    }

    pub fn budgets(&self) -> Vec<CategoryBudget> {
        self.read().budgets.clone()
    }

    pub fn put_budget(&self, budget: CategoryBudget) {
        let mut book = self.write();
        match book.budgets.iter_mut().find(|b| b.id == budget.id) {
            Some(slot) => *slot = budget,
            None => book.budgets.push(budget),
        }
        book.touch();
    }

    fn read(&self) -> RwLockReadGuard<'_, Book> {
        self.inner.read().expect("book lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Book> {
        self.inner.write().expect("book lock poisoned")
    }

    /// Listeners run after the data lock is released, so they are free to
    /// read from and write back into the store.
    fn notify(&self, event: ChangeEvent) {
        let listeners: Vec<ChangeListener> = self
            .listeners
            .lock()
            .expect("listener lock poisoned")
            .clone();
        for listener in listeners {
            listener(event);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed for MemoryStore {
    fn subscribe(&self, listener: ChangeListener) {
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .push(listener);
    }
}

impl TransactionStore for MemoryStore {
    fn transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.read().transactions.clone())
    }

    fn transaction(&self, id: Uuid) -> Result<Transaction> {
        self.read()
            .transaction(id)
            .cloned()
            .ok_or(FinanceError::TransactionNotFound(id))
    }

    fn put_transaction(&self, transaction: Transaction) -> Result<()> {
        {
            let mut book = self.write();
            match book.transactions.iter_mut().find(|t| t.id == transaction.id) {
                Some(slot) => *slot = transaction,
                None => book.transactions.push(transaction),
            }
            book.touch();
        }
        self.notify(ChangeEvent::Transactions);
        Ok(())
    }

    fn remove_transaction(&self, id: Uuid) -> Result<Transaction> {
        let removed = {
            let mut book = self.write();
            let index = book
                .transactions
                .iter()
                .position(|t| t.id == id)
                .ok_or(FinanceError::TransactionNotFound(id))?;
            let removed = book.transactions.remove(index);
            book.touch();
            removed
        };
        self.notify(ChangeEvent::Transactions);
        Ok(removed)
    }
}

impl CardStore for MemoryStore {
    fn cards(&self) -> Result<Vec<Card>> {
        Ok(self.read().cards.clone())
    }

    fn card(&self, id: Uuid) -> Result<Card> {
        self.read()
            .card(id)
            .cloned()
            .ok_or(FinanceError::CardNotFound(id))
    }

    fn put_card(&self, card: Card) -> Result<()> {
        {
            let mut book = self.write();
            match book.cards.iter_mut().find(|c| c.id == card.id) {
                Some(slot) => *slot = card,
                None => book.cards.push(card),
            }
            book.touch();
        }
        self.notify(ChangeEvent::Cards);
        Ok(())
    }
}

impl AccountStore for MemoryStore {
    fn accounts(&self) -> Result<Vec<Account>> {
        Ok(self.read().accounts.clone())
    }

    fn account(&self, id: Uuid) -> Result<Account> {
        self.read()
            .account(id)
            .cloned()
            .ok_or(FinanceError::AccountNotFound(id))
    }

    fn put_account(&self, account: Account) -> Result<()> {
        let mut book = self.write();
        match book.accounts.iter_mut().find(|a| a.id == account.id) {
            Some(slot) => *slot = account,
            None => book.accounts.push(account),
        }
        book.touch();
        Ok(())
    }
}

impl InvoiceStore for MemoryStore {
    fn invoices(&self) -> Result<Vec<Invoice>> {
        Ok(self.read().invoices.clone())
    }

    fn invoice(&self, id: Uuid) -> Result<Invoice> {
        self.read()
            .invoice(id)
            .cloned()
            .ok_or(FinanceError::InvoiceNotFound(id))
    }

    fn invoice_for(&self, card_id: Uuid, period: PeriodKey) -> Result<Option<Invoice>> {
        Ok(self.read().invoice_for(card_id, period).cloned())
    }

    fn put_invoice(&self, invoice: Invoice) -> Result<()> {
        let mut book = self.write();
        match book.invoices.iter_mut().find(|i| i.id == invoice.id) {
            Some(slot) => *slot = invoice,
            None => book.invoices.push(invoice),
        }
        book.touch();
        Ok(())
    }

    fn insert_new_invoice(&self, invoice: Invoice) -> Result<()> {
        // Uniqueness check and insert under one write lock.
        let mut book = self.write();
        if book.invoice_for(invoice.card_id, invoice.period).is_some() {
            return Err(FinanceError::DuplicateInvoice {
                card_id: invoice.card_id,
                period: invoice.period,
            });
        }
        book.invoices.push(invoice);
        book.touch();
        Ok(())
    }
}

impl RecurringStore for MemoryStore {
    fn recurring_expenses(&self) -> Result<Vec<RecurringExpense>> {
        Ok(self.read().recurring.clone())
    }

    fn put_recurring(&self, template: RecurringExpense) -> Result<()> {
        let mut book = self.write();
        match book.recurring.iter_mut().find(|r| r.id == template.id) {
            Some(slot) => *slot = template,
            None => book.recurring.push(template),
        }
        book.touch();
        Ok(())
    }
}
