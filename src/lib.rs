#![doc(test(attr(deny(warnings))))]

//! Billfold Core models everyday accounts and credit cards: billing cycles,
//! installment plans, invoice reconciliation, and statement settlement on top
//! of a pluggable storage layer.

pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod time;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        core::utils::init_tracing();
        tracing::info!("Billfold Core tracing initialized.");
    });
}
