use crate::ledger::Ledger;

/// Ready-made queries for `Catalog::search`: case-insensitive substring
/// match on the text fields, exact match on year.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchQuery {
    Title(String),
    Author(String),
    Category(String),
    Year(i32),
}

impl SearchQuery {
    pub fn matches(&self, ledger: &Ledger) -> bool {
        match self {
            SearchQuery::Title(needle) => contains_ignore_case(ledger.title(), needle),
            SearchQuery::Author(needle) => contains_ignore_case(ledger.author(), needle),
            SearchQuery::Category(needle) => contains_ignore_case(ledger.category(), needle),
            SearchQuery::Year(year) => ledger.year() == *year,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
