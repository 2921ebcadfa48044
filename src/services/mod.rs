pub mod language_model;
#[cfg(test)]
pub mod testing;
pub mod version_control;
pub mod web_search;

pub use language_model::{LanguageModelService, Prompt};
pub use version_control::VersionControlService;
pub use web_search::WebSearchService;
