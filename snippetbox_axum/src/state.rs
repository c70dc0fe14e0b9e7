use std::sync::Arc;

use snippetbox::{SessionManager, SnippetStore, UserStore};

use crate::config::PipelineConfig;

/// Everything the pipeline and pages share, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub users: Arc<dyn UserStore>,
    pub snippets: Arc<dyn SnippetStore>,
    pub config: Arc<PipelineConfig>,
}

impl AppState {
    pub fn new(
        sessions: SessionManager,
        users: Arc<dyn UserStore>,
        snippets: Arc<dyn SnippetStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            sessions,
            users,
            snippets,
            config: Arc::new(config),
        }
    }
}
