use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::copy::BookCopy;
use crate::error::LibraryError;

/// Authoritative loan state for one (title, author) pair: every physical
/// copy, the FIFO waiting list, and the cumulative borrow count.
#[derive(Clone, Debug, PartialEq)]
pub struct Ledger {
    title: String,
    author: String,
    category: String,
    year: i32,
    // Ascending copy_id order; copies[i].copy_id == i + 1.
    copies: Vec<BookCopy>,
    waiting_list: VecDeque<String>,
    borrow_count: u64,
}

/// Result of a borrow attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BorrowOutcome {
    /// A copy was available and is now on loan to the requester.
    Lent(u32),
    /// No copy was available; the requester holds the given zero-based
    /// waitlist position. Re-borrowing while queued keeps the position.
    Queued { position: usize },
}

/// Result of a successful return.
///
/// When the waiting list was non-empty, the returned copy went straight
/// back out on loan and `served` names the requester who received it, so
/// the notification collaborator can be told.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub copy_id: u32,
    pub served: Option<String>,
}

impl Ledger {
    /// Create a ledger with `total_copies` available copies and an empty
    /// waiting list.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
        year: i32,
        total_copies: u32,
    ) -> Result<Self, LibraryError> {
        let title = title.into();
        let author = author.into();
        let category = category.into();

        for (field, value) in [
            ("title", &title),
            ("author", &author),
            ("category", &category),
        ] {
            if value.trim().is_empty() {
                return Err(LibraryError::InvalidArgument(format!(
                    "{} cannot be empty",
                    field
                )));
            }
        }

        Ok(Ledger {
            title,
            author,
            category,
            year,
            copies: (1..=total_copies).map(BookCopy::available).collect(),
            waiting_list: VecDeque::new(),
            borrow_count: 0,
        })
    }

    /// Rebuild a ledger from persisted state. Used by the catalog when
    /// loading; rejects rows that would violate an invariant.
    pub(crate) fn from_parts(
        title: String,
        author: String,
        category: String,
        year: i32,
        total_copies: u32,
        loaned_copy_ids: &[u32],
        waiting_list: Vec<String>,
        borrow_count: u64,
    ) -> Result<Self, LibraryError> {
        let mut ledger = Ledger::new(title, author, category, year, total_copies)?;

        for &copy_id in loaned_copy_ids {
            let copy = ledger.copy_mut(copy_id).ok_or_else(|| {
                LibraryError::Persistence(format!(
                    "loaned copy id {} is outside 1..={}",
                    copy_id, total_copies
                ))
            })?;
            if copy.on_loan {
                return Err(LibraryError::Persistence(format!(
                    "copy id {} listed as loaned twice",
                    copy_id
                )));
            }
            copy.on_loan = true;
        }

        for requester in &waiting_list {
            if ledger.waiting_list.contains(requester) {
                return Err(LibraryError::Persistence(format!(
                    "requester '{}' queued twice",
                    requester
                )));
            }
            ledger.waiting_list.push_back(requester.clone());
        }
        ledger.borrow_count = borrow_count;

        Ok(ledger)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn total_copies(&self) -> u32 {
        self.copies.len() as u32
    }

    pub fn available_count(&self) -> u32 {
        self.copies.iter().filter(|c| !c.on_loan).count() as u32
    }

    pub fn on_loan_count(&self) -> u32 {
        self.copies.iter().filter(|c| c.on_loan).count() as u32
    }

    pub fn is_available(&self) -> bool {
        self.available_count() > 0
    }

    pub fn borrow_count(&self) -> u64 {
        self.borrow_count
    }

    /// Popularity is cumulative borrows plus current demand.
    pub fn popularity_score(&self) -> u64 {
        self.borrow_count + self.waiting_list.len() as u64
    }

    pub fn waiting_list(&self) -> impl Iterator<Item = &str> {
        self.waiting_list.iter().map(String::as_str)
    }

    /// Zero-based queue position, or `None` when the requester is not
    /// waiting.
    pub fn waitlist_position(&self, requester: &str) -> Option<usize> {
        self.waiting_list.iter().position(|r| r == requester)
    }

    /// Grow or shrink the copy pool. Growth appends available copies with
    /// ascending ids; shrinking fails when a retired id is still on loan.
    pub fn resize(&mut self, new_total: u32) -> Result<(), LibraryError> {
        let current = self.total_copies();
        if new_total >= current {
            self.copies
                .extend((current + 1..=new_total).map(BookCopy::available));
            return Ok(());
        }

        let still_loaned: Vec<u32> = self.copies[new_total as usize..]
            .iter()
            .filter(|c| c.on_loan)
            .map(|c| c.copy_id)
            .collect();
        if !still_loaned.is_empty() {
            return Err(LibraryError::Conflict(format!(
                "cannot shrink '{}' to {} copies: copies {:?} are on loan",
                self.title, new_total, still_loaned
            )));
        }

        self.copies.truncate(new_total as usize);
        Ok(())
    }

    /// Lend the lowest-numbered available copy, or queue the requester
    /// when every copy is out. Queueing is idempotent per requester.
    pub fn borrow(&mut self, requester: &str) -> Result<BorrowOutcome, LibraryError> {
        if requester.trim().is_empty() {
            return Err(LibraryError::InvalidArgument(
                "requester id cannot be empty".to_string(),
            ));
        }

        if let Some(copy) = self.copies.iter_mut().find(|c| !c.on_loan) {
            copy.on_loan = true;
            self.borrow_count += 1;
            return Ok(BorrowOutcome::Lent(copy.copy_id));
        }

        let position = match self.waitlist_position(requester) {
            Some(existing) => existing,
            None => {
                self.waiting_list.push_back(requester.to_string());
                self.waiting_list.len() - 1
            }
        };
        Ok(BorrowOutcome::Queued { position })
    }

    /// Return a specific copy. When someone is waiting, the head of the
    /// queue is served immediately with the same copy.
    pub fn return_copy(&mut self, copy_id: u32) -> Result<ReturnReceipt, LibraryError> {
        let copy = self
            .copy_mut(copy_id)
            .filter(|c| c.on_loan)
            .ok_or(LibraryError::CopyNotFound { copy_id })?;
        copy.on_loan = false;

        let served = self.waiting_list.pop_front();
        if served.is_some() {
            // Re-lend the copy we just took back to the head of the queue.
            let copy = self
                .copy_mut(copy_id)
                .ok_or(LibraryError::CopyNotFound { copy_id })?;
            copy.on_loan = true;
            self.borrow_count += 1;
        }

        Ok(ReturnReceipt { copy_id, served })
    }

    /// Drop a requester from the waiting list. Absent requesters are a
    /// no-op, not an error. Returns whether anything changed.
    pub fn cancel_wait(&mut self, requester: &str) -> bool {
        match self.waitlist_position(requester) {
            Some(position) => {
                self.waiting_list.remove(position);
                true
            }
            None => false,
        }
    }

    /// Point-in-time view of the ledger, suitable for display and search.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            title: self.title.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
            year: self.year,
            total_copies: self.total_copies(),
            available_count: self.available_count(),
            loaned_copy_ids: self
                .copies
                .iter()
                .filter(|c| c.on_loan)
                .map(|c| c.copy_id)
                .collect(),
            waiting_list: self.waiting_list.iter().cloned().collect(),
            borrow_count: self.borrow_count,
            popularity_score: self.popularity_score(),
        }
    }

    fn copy_mut(&mut self, copy_id: u32) -> Option<&mut BookCopy> {
        if copy_id == 0 {
            return None;
        }
        self.copies.get_mut(copy_id as usize - 1)
    }
}

/// Immutable view of one ledger's state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub title: String,
    pub author: String,
    pub category: String,
    pub year: i32,
    pub total_copies: u32,
    pub available_count: u32,
    pub loaned_copy_ids: Vec<u32>,
    pub waiting_list: Vec<String>,
    pub borrow_count: u64,
    pub popularity_score: u64,
}

impl fmt::Display for LedgerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Title={}, Author={}, Category={}, Year={}, Copies={}, Available={} | Borrow Count: {}",
            self.title,
            self.author,
            self.category,
            self.year,
            self.total_copies,
            self.available_count,
            self.borrow_count
        )
    }
}
