mod copy;
mod ledger;

pub use copy::BookCopy;
pub use ledger::{BorrowOutcome, Ledger, LedgerSnapshot, ReturnReceipt};
