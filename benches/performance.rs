use std::sync::Arc;

use billfold_core::core::ReconcileEngine;
use billfold_core::ledger::{
    billing, Account, AccountKind, Book, Card, FundingSource, PeriodKey, Transaction,
    TransactionKind,
};
use billfold_core::storage::json_backend::{load_book_from_path, save_book_to_path};
use billfold_core::storage::MemoryStore;
use billfold_core::time::FixedClock;
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::tempdir;

fn build_sample_book(txn_count: usize) -> Book {
    let mut book = Book::new("Benchmark");

    let account_id = book.add_account(
        Account::new("Checking", "First Bank", AccountKind::Checking).with_balance(25_000.0),
    );
    let mut card_ids = Vec::new();
    for (name, closing, due) in [("Violet", 15u32, 25u32), ("Coral", 28, 5), ("Slate", 31, 10)] {
        let card = Card::new(name, "Visa", 8000.0, closing, due).with_account(account_id);
        card_ids.push(book.add_card(card));
    }

    let start_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    for idx in 0..txn_count {
        let on = start_date + Duration::days((idx % 365) as i64);
        let card_id = card_ids[idx % card_ids.len()];
        book.add_transaction(Transaction::new(
            format!("charge {idx}"),
            5.0 + (idx % 100) as f64,
            on,
            "misc",
            TransactionKind::Expense,
            FundingSource::Card(card_id),
        ));
    }
    book
}

fn bench_book_io(c: &mut Criterion) {
    let book = build_sample_book(black_box(10_000));
    let dir = tempdir().expect("tempdir");
    let file_path = dir.path().join("book.json");

    c.bench_function("book_save_10k", |b| {
        b.iter(|| {
            save_book_to_path(&book, &file_path).expect("save book");
        })
    });

    save_book_to_path(&book, &file_path).expect("seed");

    c.bench_function("book_load_10k", |b| {
        b.iter(|| {
            let loaded = load_book_from_path(&file_path).expect("load book");
            black_box(loaded);
        })
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let book = build_sample_book(black_box(10_000));
    let today = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();

    c.bench_function("reconcile_first_pass_10k", |b| {
        b.iter_batched(
            || {
                let store = Arc::new(MemoryStore::from_book(book.clone()));
                ReconcileEngine::new(store, Arc::new(FixedClock(today)))
            },
            |engine| {
                let report = engine.reconcile().expect("reconcile");
                black_box(report);
            },
            BatchSize::SmallInput,
        );
    });

    let store = Arc::new(MemoryStore::from_book(book.clone()));
    let engine = ReconcileEngine::new(store, Arc::new(FixedClock(today)));
    engine.reconcile().expect("seed invoices");

    c.bench_function("reconcile_steady_state_10k", |b| {
        b.iter(|| {
            let report = engine.reconcile().expect("reconcile");
            black_box(report);
        })
    });
}

fn bench_billing_math(c: &mut Criterion) {
    let book = build_sample_book(black_box(10_000));
    let card = book.cards[0].clone();
    let period = PeriodKey::from_parts(2025, 6).unwrap();
    let cycle = billing::cycle_for_period(&card, period);

    c.bench_function("cycle_total_10k", |b| {
        b.iter(|| {
            let total = billing::cycle_total(card.id, &cycle, &book.transactions);
            black_box(total);
        })
    });

    c.bench_function("classify_10k", |b| {
        b.iter(|| {
            for tx in &book.transactions {
                black_box(billing::classify_transaction_date(tx.date, card.closing_day));
            }
        })
    });
}

criterion_group!(benches, bench_book_io, bench_reconcile, bench_billing_math);
criterion_main!(benches);
