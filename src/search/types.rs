use serde::Deserialize;
use serde_json::Value;

/// One page of a search response as the API returns it. `total_count` and
/// `incomplete_results` are authoritative on the first page only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPage {
    pub total_count: Option<u64>,
    pub incomplete_results: Option<bool>,
    #[serde(default)]
    pub items: Vec<Value>,
}

/// Aggregate of all fetched pages for one search. `query` is the final
/// query sent to the API, including any appended qualifiers.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub query: String,
    pub total_count: u64,
    pub incomplete_results: bool,
    pub items: Vec<Value>,
}
