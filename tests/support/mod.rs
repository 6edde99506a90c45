use circulate::{Catalog, Ledger, MemoryStore, Store};

/// Catalog over a fresh in-memory store, returned together with a handle
/// onto the same store so tests can inspect what was persisted.
pub fn empty_catalog() -> (Catalog<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    let catalog = Catalog::open(store.clone()).expect("open empty catalog");
    (catalog, store)
}

/// The copy-count reconciliation invariant, checked across a whole catalog.
pub fn assert_reconciled<S: Store>(catalog: &Catalog<S>) {
    for ledger in catalog.iter() {
        assert_eq!(
            ledger.available_count() + ledger.on_loan_count(),
            ledger.total_copies(),
            "copy counts out of balance for '{}'",
            ledger.title()
        );
        assert_no_duplicate_waiters(ledger);
    }
}

pub fn assert_no_duplicate_waiters(ledger: &Ledger) {
    let waiters: Vec<&str> = ledger.waiting_list().collect();
    let mut deduped = waiters.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(
        waiters.len(),
        deduped.len(),
        "duplicate waitlist entry for '{}'",
        ledger.title()
    );
}
