#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}
