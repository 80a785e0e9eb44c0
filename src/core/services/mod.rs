pub mod account_service;
pub mod card_service;
pub mod import_service;
pub mod recurring_service;
pub mod transaction_service;

pub use account_service::AccountService;
pub use card_service::CardService;
pub use import_service::{ImportReport, ImportService, SkippedCandidate};
pub use recurring_service::RecurringService;
pub use transaction_service::TransactionService;
