use uuid::Uuid;

use crate::errors::{FinanceError, Result};
use crate::ledger::Account;
use crate::storage::FinanceStore;

/// Validated CRUD helpers for bank accounts. Accounts are never deleted:
/// transaction history and settlement records keep pointing at them.
pub struct AccountService;

impl AccountService {
    pub fn add(store: &dyn FinanceStore, account: Account) -> Result<Uuid> {
        Self::validate_name(store, None, &account.name)?;
        let id = account.id;
        store.put_account(account)?;
        Ok(id)
    }

    /// Applies the editable fields. The balance is owned by the balance
    /// ledger and settlement and is never edited directly.
    pub fn edit(store: &dyn FinanceStore, id: Uuid, changes: Account) -> Result<()> {
        Self::validate_name(store, Some(id), &changes.name)?;
        let mut account = store.account(id)?;
        account.name = changes.name;
        account.institution = changes.institution;
        account.routing_number = changes.routing_number;
        account.account_number = changes.account_number;
        account.kind = changes.kind;
        store.put_account(account)
    }

    pub fn list(store: &dyn FinanceStore) -> Result<Vec<Account>> {
        store.accounts()
    }

    fn validate_name(
        store: &dyn FinanceStore,
        exclude: Option<Uuid>,
        candidate: &str,
    ) -> Result<()> {
        if candidate.trim().is_empty() {
            return Err(FinanceError::Validation("account name is empty".into()));
        }
        let normalized = candidate.trim().to_ascii_lowercase();
        let duplicate = store.accounts()?.iter().any(|account| {
            account.name.trim().to_ascii_lowercase() == normalized
                && exclude.map_or(true, |id| account.id != id)
        });
        if duplicate {
            Err(FinanceError::Validation(format!(
                "account `{candidate}` already exists"
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::AccountKind;
    use crate::storage::{AccountStore, MemoryStore};

    #[test]
    fn duplicate_names_are_rejected_case_insensitively() {
        let store = MemoryStore::new();
        AccountService::add(&store, Account::new("Main", "Bank", AccountKind::Checking)).unwrap();
        let err = AccountService::add(&store, Account::new("main", "Other", AccountKind::Savings))
            .expect_err("duplicate name must fail");
        assert!(matches!(err, FinanceError::Validation(_)));
    }

    #[test]
    fn edit_keeps_the_balance_untouched() {
        let store = MemoryStore::new();
        let id = AccountService::add(
            &store,
            Account::new("Main", "Bank", AccountKind::Checking).with_balance(500.0),
        )
        .unwrap();

        let changes = Account::new("Daily", "Bank", AccountKind::Checking).with_balance(0.0);
        AccountService::edit(&store, id, changes).unwrap();

        let account = store.account(id).unwrap();
        assert_eq!(account.name, "Daily");
        assert_eq!(account.balance, 500.0);
    }

    #[test]
    fn renaming_to_your_own_name_is_allowed() {
        let store = MemoryStore::new();
        let id = AccountService::add(&store, Account::new("Main", "Bank", AccountKind::Checking))
            .unwrap();
        let same = Account::new("Main", "Credit Union", AccountKind::Checking);
        AccountService::edit(&store, id, same).unwrap();
        assert_eq!(store.account(id).unwrap().institution, "Credit Union");
    }
}
