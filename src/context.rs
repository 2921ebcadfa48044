use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{LanguageModelService, VersionControlService, WebSearchService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub version_control: Arc<dyn VersionControlService>,
    pub web_search: Arc<dyn WebSearchService>,
    pub language_model: Arc<dyn LanguageModelService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        version_control: Arc<dyn VersionControlService>,
        web_search: Arc<dyn WebSearchService>,
        language_model: Arc<dyn LanguageModelService>,
    ) -> Self {
        Self {
            config,
            version_control,
            web_search,
            language_model,
        }
    }
}
