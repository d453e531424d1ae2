use std::sync::Arc;

use crate::chain::RagChain;
use crate::chat::ResponseGenerator;
use crate::core::config::{AppPaths, ConfigService, ModelSettings, RagSettings, ServerSettings};
use crate::llm::OpenAiCompatibleProvider;
use crate::rag::{RagStore, SqliteRagStore};

pub mod error;

pub use error::InitializationError;

/// Shared state for every route. Nothing in here changes after start-up;
/// the transcript lives entirely in the requests.
#[derive(Clone)]
pub struct AppState {
    pub server: ServerSettings,
    pub models: ModelSettings,
    pub store: Arc<dyn RagStore>,
    pub chat: Arc<dyn ResponseGenerator>,
}

impl AppState {
    /// Builds the state the server runs on:
    /// 1. Load and validate configuration
    /// 2. Read the model credential from the environment (fatal when absent)
    /// 3. Open the chunk store read-only
    /// 4. Wire the embedding and generation clients into the chain
    ///
    /// Must run inside the tokio runtime; the store pool connects lazily.
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let raw = ConfigService::new(paths.clone())
            .load_config()
            .map_err(InitializationError::Config)?;

        let server = ServerSettings::from_config(&raw);
        let rag = RagSettings::from_config(&raw);
        let models = ModelSettings::from_config(&raw);

        let credential = read_credential(&models.credential_env)?;

        let store_dir = paths.resolve(&rag.store_dir);
        tracing::info!("Using chunk store at {}", store_dir.display());
        let store: Arc<dyn RagStore> = Arc::new(SqliteRagStore::open_read_only(&store_dir));

        let generator = Arc::new(OpenAiCompatibleProvider::new(
            models.text_model.base_url.clone(),
            Some(credential.clone()),
        ));
        let embedder = Arc::new(OpenAiCompatibleProvider::new(
            models.embedding_model.base_url.clone(),
            Some(credential),
        ));

        let chain = RagChain::new(store.clone(), generator, embedder, models.clone(), rag.top_k)
            .map_err(InitializationError::Chain)?;

        Ok(Arc::new(AppState {
            server,
            models,
            store,
            chat: Arc::new(chain),
        }))
    }
}

fn read_credential(var: &str) -> Result<String, InitializationError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(InitializationError::MissingCredential(var.to_string())),
    }
}
