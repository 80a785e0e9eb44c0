//! Orchestration: the reconcile engine, the settlement processor, and the
//! validated service layer on top of the store traits.

pub mod reconcile;
pub mod services;
pub mod settlement;
pub mod utils;

pub use reconcile::{ReconcileEngine, ReconcileReport};
pub use settlement::{SettlementOutcome, SettlementProcessor};
