mod catalog;
mod search;
mod store;

pub use catalog::{AddOutcome, Catalog};
pub use search::SearchQuery;
pub use store::{JsonFileStore, MemoryStore, Store, TitleRow, SCHEMA_VERSION};
