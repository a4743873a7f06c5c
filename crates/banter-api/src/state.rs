//! Application state wiring all services together.
//!
//! `AppState` holds the concrete service instances used by both CLI and
//! HTTP handlers. `ChatService` is generic over its repository and gateway;
//! here it is pinned to the SQLite store and the boxed gateway.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use minijinja::Environment;

use banter_core::chat::context::ContextBuilder;
use banter_core::chat::service::{ChatService, CompletionSettings};
use banter_core::llm::box_gateway::BoxCompletionGateway;
use banter_infra::config::{apply_overrides, database_url, load_config, resolve_data_dir};
use banter_infra::llm::create_gateway;
use banter_infra::sqlite::pool::DatabasePool;
use banter_infra::sqlite::session::SqliteSessionStore;
use banter_infra::sqlite::turn::SqliteTurnRepository;
use banter_types::config::AppConfig;

/// Concrete chat service pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteTurnRepository, BoxCompletionGateway>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub sessions: SqliteSessionStore,
    pub config: Arc<AppConfig>,
    pub templates: Arc<Environment<'static>>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load config, connect to the database, and build the gateway.
    ///
    /// A missing API key is not an error here; sends report it.
    pub async fn init(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_dir.join("config.toml"));
        let config = load_config(&config_path).await;
        let config = apply_overrides(config, |key| std::env::var(key).ok());

        let db_pool = DatabasePool::new(&database_url(&config, &data_dir)).await?;
        let gateway = create_gateway(&config.completion)?;

        Self::from_parts(config, db_pool, gateway, data_dir)
    }

    /// Wire state from already-built parts.
    pub fn from_parts(
        config: AppConfig,
        db_pool: DatabasePool,
        gateway: BoxCompletionGateway,
        data_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let sessions = SqliteSessionStore::new(
            db_pool.clone(),
            Duration::from_secs(config.session.idle_timeout_secs),
        );

        let settings = CompletionSettings {
            model: config.completion.model.clone(),
            temperature: config.completion.temperature,
            max_tokens: config.completion.max_tokens,
        };
        let chat_service = ChatService::new(
            SqliteTurnRepository::new(db_pool),
            gateway,
            ContextBuilder::new(config.history.context_window),
            settings,
            config.history.page_limit,
        );

        Ok(Self {
            chat_service: Arc::new(chat_service),
            sessions,
            config: Arc::new(config),
            templates: Arc::new(crate::http::handlers::page::build_templates()?),
            data_dir,
        })
    }
}
