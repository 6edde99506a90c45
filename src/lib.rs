mod catalog;
mod error;
mod ledger;
mod notify;
mod ranking;

pub use catalog::{
    AddOutcome, Catalog, JsonFileStore, MemoryStore, SearchQuery, Store, TitleRow, SCHEMA_VERSION,
};
pub use error::LibraryError;
pub use ledger::{BookCopy, BorrowOutcome, Ledger, LedgerSnapshot, ReturnReceipt};
pub use notify::{Notification, NotificationKind, NOTIFICATION_EVENT};

// Re-export the EventEmitter from the event_emitter_rs crate
pub use event_emitter_rs::EventEmitter;
