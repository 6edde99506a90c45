use std::fmt;

use event_emitter_rs::EventEmitter;
use tracing::{info, warn};

use super::search::SearchQuery;
use super::store::{Store, TitleRow, SCHEMA_VERSION};
use crate::error::LibraryError;
use crate::ledger::{BorrowOutcome, Ledger, LedgerSnapshot, ReturnReceipt};
use crate::notify::{Notification, NOTIFICATION_EVENT};

/// Whether `add_title` created a new ledger or grew an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Created,
    Updated,
}

/// The collection of ledgers, keyed by exact (title, author) identity.
///
/// The catalog owns persistence orchestration: every mutation is staged on
/// a cloned ledger, written through the store, and only then swapped into
/// memory. A failed save therefore leaves the in-memory state untouched,
/// so memory and storage never diverge. Notifications fire only after the
/// mutation has persisted.
///
/// Mutations take `&mut self`; callers that share a catalog across threads
/// wrap it in their own lock.
pub struct Catalog<S: Store> {
    store: S,
    // Insertion order is observable: it breaks full popularity ties.
    ledgers: Vec<Ledger>,
    emitter: EventEmitter,
}

impl<S: Store> fmt::Debug for Catalog<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("ledgers", &self.ledgers)
            .finish()
    }
}

impl<S: Store> Catalog<S> {
    /// Load the persisted row set and build a catalog over it.
    pub fn open(store: S) -> Result<Self, LibraryError> {
        let ledgers = Self::ledgers_from_rows(store.load()?)?;
        Ok(Catalog {
            store,
            ledgers,
            emitter: EventEmitter::new(),
        })
    }

    /// Replace the entire in-memory set from the store.
    pub fn reload(&mut self) -> Result<(), LibraryError> {
        self.ledgers = Self::ledgers_from_rows(self.store.load()?)?;
        Ok(())
    }

    fn ledgers_from_rows(rows: Vec<TitleRow>) -> Result<Vec<Ledger>, LibraryError> {
        let mut ledgers: Vec<Ledger> = Vec::with_capacity(rows.len());
        for row in rows {
            if row.schema_version != SCHEMA_VERSION {
                return Err(LibraryError::Persistence(format!(
                    "unknown row schema version {} (supported: {})",
                    row.schema_version, SCHEMA_VERSION
                )));
            }
            if ledgers
                .iter()
                .any(|l| l.title() == row.title && l.author() == row.author)
            {
                return Err(LibraryError::Persistence(format!(
                    "duplicate row for '{}' by {}",
                    row.title, row.author
                )));
            }
            ledgers.push(Ledger::from_parts(
                row.title,
                row.author,
                row.category,
                row.year,
                row.total_copies,
                &row.loaned_copy_ids,
                row.waiting_list,
                row.borrow_count,
            )?);
        }
        Ok(ledgers)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }

    /// Ledgers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Ledger> {
        self.ledgers.iter()
    }

    /// Exact (title, author) lookup.
    pub fn get(&self, title: &str, author: &str) -> Option<&Ledger> {
        self.position_of(title, author).map(|i| &self.ledgers[i])
    }

    /// Register a listener for catalog notifications. Returns the listener
    /// id assigned by the emitter.
    pub fn on_notification<F>(&mut self, listener: F) -> String
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        self.emitter.on(NOTIFICATION_EVENT, listener)
    }

    /// Add a title. Re-adding an existing (title, author) is additive: the
    /// existing ledger grows by `copies`.
    pub fn add_title(
        &mut self,
        title: &str,
        author: &str,
        category: &str,
        year: i32,
        copies: u32,
    ) -> Result<AddOutcome, LibraryError> {
        if let Some(index) = self.position_of(title, author) {
            let mut staged = self.ledgers[index].clone();
            staged.resize(staged.total_copies() + copies)?;
            let note =
                (copies > 0).then(|| Notification::copies_added(title, author, copies));
            self.commit_replace(index, staged, note)?;
            info!(title, author, copies, "added copies to existing title");
            return Ok(AddOutcome::Updated);
        }

        let staged = Ledger::new(title, author, category, year, copies)?;
        let note = Notification::title_added(title, author);
        self.commit_replace(self.ledgers.len(), staged, Some(note))?;
        info!(title, author, copies, "added new title");
        Ok(AddOutcome::Created)
    }

    /// Remove a title outright. Fails while any copy is on loan.
    pub fn remove_title(&mut self, title: &str, author: &str) -> Result<(), LibraryError> {
        let index = self.position_or_not_found(title, author)?;
        let ledger = &self.ledgers[index];
        if ledger.on_loan_count() > 0 {
            warn!(title, author, "refusing to remove title with active loans");
            return Err(LibraryError::Conflict(format!(
                "cannot remove '{}' by {}: {} copies are on loan",
                title,
                author,
                ledger.on_loan_count()
            )));
        }

        let rows = self.rows_excluding(index);
        self.store.save(&rows)?;
        self.ledgers.remove(index);
        self.emit(Notification::title_removed(title, author));
        info!(title, author, "removed title");
        Ok(())
    }

    /// Borrow a copy for `requester`, or queue them when none is free.
    pub fn borrow(
        &mut self,
        title: &str,
        author: &str,
        requester: &str,
    ) -> Result<BorrowOutcome, LibraryError> {
        let index = self.position_or_not_found(title, author)?;
        let mut staged = self.ledgers[index].clone();
        let outcome = staged.borrow(requester)?;
        self.commit_replace(index, staged, None)?;

        match &outcome {
            BorrowOutcome::Lent(copy_id) => {
                info!(title, author, requester, copy_id, "copy lent");
            }
            BorrowOutcome::Queued { position } => {
                info!(title, author, requester, position, "requester queued");
            }
        }
        Ok(outcome)
    }

    /// Return a copy; the waitlist head, if any, is served with the same
    /// copy and notified.
    pub fn return_copy(
        &mut self,
        title: &str,
        author: &str,
        copy_id: u32,
    ) -> Result<ReturnReceipt, LibraryError> {
        let index = self.position_or_not_found(title, author)?;
        let mut staged = self.ledgers[index].clone();
        let receipt = staged.return_copy(copy_id)?;
        let note = receipt
            .served
            .as_deref()
            .map(|requester| Notification::waitlist_served(title, author, requester));
        self.commit_replace(index, staged, note)?;

        info!(
            title,
            author,
            copy_id,
            served = receipt.served.as_deref().unwrap_or(""),
            "copy returned"
        );
        Ok(receipt)
    }

    /// Take a requester off a title's waiting list. Returns whether they
    /// were queued; an absent requester is a no-op, not an error.
    pub fn cancel_wait(
        &mut self,
        title: &str,
        author: &str,
        requester: &str,
    ) -> Result<bool, LibraryError> {
        let index = self.position_or_not_found(title, author)?;
        let mut staged = self.ledgers[index].clone();
        if !staged.cancel_wait(requester) {
            return Ok(false);
        }
        self.commit_replace(index, staged, None)?;
        info!(title, author, requester, "waitlist entry cancelled");
        Ok(true)
    }

    /// All ledger snapshots satisfying the predicate. Pure read.
    pub fn find<P>(&self, predicate: P) -> Vec<LedgerSnapshot>
    where
        P: Fn(&Ledger) -> bool,
    {
        self.ledgers
            .iter()
            .filter(|l| predicate(*l))
            .map(Ledger::snapshot)
            .collect()
    }

    /// `find` with one of the ready-made queries.
    pub fn search(&self, query: &SearchQuery) -> Vec<LedgerSnapshot> {
        self.find(|ledger| query.matches(ledger))
    }

    fn position_of(&self, title: &str, author: &str) -> Option<usize> {
        self.ledgers
            .iter()
            .position(|l| l.title() == title && l.author() == author)
    }

    fn position_or_not_found(&self, title: &str, author: &str) -> Result<usize, LibraryError> {
        self.position_of(title, author)
            .ok_or_else(|| LibraryError::TitleNotFound {
                title: title.to_string(),
                author: author.to_string(),
            })
    }

    /// Persist the row set with `staged` at `index` (appending when `index`
    /// is one past the end), then swap it into memory and emit the
    /// notification. Save failures leave memory untouched.
    fn commit_replace(
        &mut self,
        index: usize,
        staged: Ledger,
        note: Option<Notification>,
    ) -> Result<(), LibraryError> {
        let mut rows: Vec<TitleRow> = self.ledgers.iter().map(row_of).collect();
        let staged_row = row_of(&staged);
        if index == rows.len() {
            rows.push(staged_row);
        } else {
            rows[index] = staged_row;
        }
        self.store.save(&rows)?;

        if index == self.ledgers.len() {
            self.ledgers.push(staged);
        } else {
            self.ledgers[index] = staged;
        }
        if let Some(note) = note {
            self.emit(note);
        }
        Ok(())
    }

    fn rows_excluding(&self, index: usize) -> Vec<TitleRow> {
        self.ledgers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, ledger)| row_of(ledger))
            .collect()
    }

    fn emit(&mut self, note: Notification) {
        self.emitter.emit(NOTIFICATION_EVENT, note);
    }
}

fn row_of(ledger: &Ledger) -> TitleRow {
    let snap = ledger.snapshot();
    TitleRow {
        schema_version: SCHEMA_VERSION,
        title: snap.title,
        author: snap.author,
        category: snap.category,
        year: snap.year,
        total_copies: snap.total_copies,
        loaned_copy_ids: snap.loaned_copy_ids,
        waiting_list: snap.waiting_list,
        borrow_count: snap.borrow_count,
    }
}
