use std::fmt;

/// Errors surfaced by catalog and ledger operations.
///
/// Business-rule failures (not found, conflict) are ordinary `Err` values;
/// callers are expected to recover by retrying with different input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// Malformed caller input: empty required fields, zero page sizes.
    InvalidArgument(String),
    /// No ledger exists for the given (title, author) pair.
    TitleNotFound { title: String, author: String },
    /// The copy id is unknown for this title, or the copy is not on loan.
    CopyNotFound { copy_id: u32 },
    /// The operation would violate an inventory invariant.
    Conflict(String),
    /// The storage collaborator failed to durably record a mutation.
    /// The in-memory state has been left untouched.
    Persistence(String),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::InvalidArgument(reason) => {
                write!(f, "invalid argument: {}", reason)
            }
            LibraryError::TitleNotFound { title, author } => {
                write!(f, "title '{}' by {} not found", title, author)
            }
            LibraryError::CopyNotFound { copy_id } => {
                write!(f, "copy {} not found or not on loan", copy_id)
            }
            LibraryError::Conflict(reason) => write!(f, "conflict: {}", reason),
            LibraryError::Persistence(reason) => {
                write!(f, "persistence failure: {}", reason)
            }
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<serde_json::Error> for LibraryError {
    fn from(e: serde_json::Error) -> Self {
        LibraryError::Persistence(e.to_string())
    }
}
