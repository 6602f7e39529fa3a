use serde::Serialize;

use crate::search::SearchResult;

/// Response for the search endpoint
#[derive(Serialize, Debug)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}
