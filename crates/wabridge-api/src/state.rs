//! Application state wiring the bridge together.
//!
//! The reply generator is chosen once here: with an API key it is an
//! `AssistantResponder` pinned to the SQLite store and the HTTP client,
//! without one it is the static `FallbackResponder`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use wabridge_core::assistant::poller::{PollPolicy, RunPoller};
use wabridge_core::conversation::ConversationClient;
use wabridge_core::provision::Provisioner;
use wabridge_core::responder::{AssistantResponder, BoxReplyGenerator, FallbackResponder};
use wabridge_infra::config::{api_key_from_env, load_bridge_config, resolve_data_dir};
use wabridge_infra::openai::OpenAiAssistantClient;
use wabridge_infra::sqlite::pool::{DatabasePool, database_url};
use wabridge_infra::sqlite::session::SqliteSessionStore;
use wabridge_types::assistant::AssistantError;
use wabridge_types::config::BridgeConfig;

/// Concrete responder type pinned to infra implementations.
pub type ConcreteResponder = AssistantResponder<SqliteSessionStore, OpenAiAssistantClient>;

/// Shared application state used by every CLI command.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BridgeConfig>,
    pub data_dir: PathBuf,
    pub sessions: Arc<SqliteSessionStore>,
    pub generator: Arc<BoxReplyGenerator>,
    api_key: Option<Arc<SecretString>>,
}

impl AppState {
    /// Load config, open the database and select the reply generator.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_bridge_config(&data_dir).await;

        let db_url = format!("{}?mode=rwc", database_url(&data_dir));
        let db_pool = DatabasePool::new(&db_url).await?;

        let api_key = api_key_from_env();
        let generator = build_generator(
            &config,
            SqliteSessionStore::new(db_pool.clone()),
            api_key.as_ref(),
        )?;

        Ok(Self {
            config: Arc::new(config),
            data_dir,
            sessions: Arc::new(SqliteSessionStore::new(db_pool)),
            generator: Arc::new(generator),
            api_key: api_key.map(Arc::new),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Provisioner over a fresh HTTP client; `NotConfigured` without an API key.
    pub fn provisioner(&self) -> Result<Provisioner<OpenAiAssistantClient>, AssistantError> {
        let key = self.api_key.as_deref().ok_or(AssistantError::NotConfigured)?;
        Ok(Provisioner::new(build_client(&self.config, key)?))
    }
}

/// Pick the reply generator: the full assistant flow with a key, the fixed
/// fallback text without one.
fn build_generator(
    config: &BridgeConfig,
    sessions: SqliteSessionStore,
    api_key: Option<&SecretString>,
) -> Result<BoxReplyGenerator, AssistantError> {
    let Some(key) = api_key else {
        warn!("OPENAI_API_KEY not set, replies will use the fallback text");
        return Ok(BoxReplyGenerator::new(FallbackResponder::new(
            config.fallback_text.clone(),
        )));
    };

    let conversation = ConversationClient::new(
        sessions,
        build_client(config, key)?,
        config.assistant.assistant_id.clone(),
    );
    let poller = RunPoller::new(PollPolicy::from(&config.poll));
    let responder: ConcreteResponder = AssistantResponder::new(conversation, poller);
    Ok(BoxReplyGenerator::new(responder))
}

fn build_client(config: &BridgeConfig, key: &SecretString) -> Result<OpenAiAssistantClient, AssistantError> {
    OpenAiAssistantClient::new(
        SecretString::from(key.expose_secret().to_owned()),
        config.assistant.base_url.clone(),
        Duration::from_secs(config.assistant.request_timeout_secs),
    )
}
