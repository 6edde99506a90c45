use serde::{Deserialize, Serialize};

/// A single physical unit of a title.
///
/// Copy ids are assigned at creation, start at 1, and stay contiguous
/// `1..=total_copies` across resizes. A copy is only ever retired by
/// shrinking the title's total, and never while it is on loan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCopy {
    pub copy_id: u32,
    pub on_loan: bool,
}

impl BookCopy {
    pub fn available(copy_id: u32) -> Self {
        BookCopy {
            copy_id,
            on_loan: false,
        }
    }
}
