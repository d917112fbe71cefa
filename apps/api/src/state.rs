use crate::config::Config;
use crate::edits::session::SessionStore;
use crate::llm_client::LlmClient;
use crate::overlay::applier::ApplierConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Reqwest client for the OCR collaborator; separate from the LLM
    /// client's so extraction timeouts can stay short.
    pub http: reqwest::Client,
    pub config: Config,
    pub sessions: SessionStore,
    pub applier: ApplierConfig,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            llm: LlmClient::new(config.anthropic_api_key.clone()),
            http: reqwest::Client::new(),
            config,
            sessions: SessionStore::new(),
            applier: ApplierConfig::default(),
        }
    }
}
