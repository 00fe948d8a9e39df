use serde::Deserialize;

/// One page of results from a paginated endpoint.
///
/// The cursor is opaque and only carried through.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Listing<T> {
    pub results: Vec<T>,
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> Listing<T> {
    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}
