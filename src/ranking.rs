use crate::catalog::{Catalog, Store};
use crate::error::LibraryError;
use crate::ledger::LedgerSnapshot;

impl<S: Store> Catalog<S> {
    /// The `n` most popular titles, as snapshots. Ordered by popularity
    /// score, then borrow count, then earliest catalog insertion. Pure
    /// read.
    pub fn top(&self, n: usize) -> Result<Vec<LedgerSnapshot>, LibraryError> {
        if n == 0 {
            return Err(LibraryError::InvalidArgument(
                "page size must be positive".to_string(),
            ));
        }

        let mut ranked: Vec<_> = self.iter().collect();
        // Stable sort: full ties keep insertion order.
        ranked.sort_by(|a, b| {
            b.popularity_score()
                .cmp(&a.popularity_score())
                .then(b.borrow_count().cmp(&a.borrow_count()))
        });
        Ok(ranked
            .into_iter()
            .take(n)
            .map(|ledger| ledger.snapshot())
            .collect())
    }
}
