use colloquy_chat::{ChatSettings, TurnPolicy, DEFAULT_MODEL_ID, DEFAULT_SYSTEM_PROMPT};
use colloquy_llm::ChatOptions;
use colloquy_store::{StoreConfig, DEFAULT_MAX_HISTORY_MESSAGES};
use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub llm_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent only when set; most servers pick a sensible default
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_llm_timeout_secs(),
            temperature: None,
            max_tokens: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8321/v1/openai/v1".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_llm_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: usize,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// 0 keeps idle conversations forever
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
    /// 0 means unbounded
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default)]
    pub turn_policy: TurnPolicy,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history_messages: default_max_history_messages(),
            system_prompt: default_system_prompt(),
            idle_ttl_secs: default_idle_ttl_secs(),
            max_conversations: default_max_conversations(),
            sweep_interval_secs: default_sweep_interval_secs(),
            turn_policy: TurnPolicy::default(),
        }
    }
}

fn default_max_history_messages() -> usize {
    DEFAULT_MAX_HISTORY_MESSAGES
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_idle_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_max_conversations() -> usize {
    10_000
}

fn default_sweep_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Route under which Llama Stack serves the OpenAI-compatible API
pub const LLAMA_STACK_OPENAI_PATH: &str = "/v1/openai/v1";

/// Normalise a `LLAMA_BASE_URL` value.
///
/// Existing deployments set it to the server root (`http://host:8321/`);
/// that root is mapped onto [`LLAMA_STACK_OPENAI_PATH`]. A URL that already
/// carries a path is used as given.
pub fn llama_stack_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let authority = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);

    if authority.is_empty() || authority.contains('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}{LLAMA_STACK_OPENAI_PATH}")
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (ENV defaults to "dev")
    /// 3. COLLOQUY_<SECTION>__<KEY> environment variables, e.g. COLLOQUY_LLM__MODEL
    /// 4. LLAMA_BASE_URL, LLAMA_MODEL_ID and PORT, kept for existing deployments.
    ///    A bare Llama Stack server root in LLAMA_BASE_URL is mapped onto its
    ///    OpenAI-compatible route, see [`llama_stack_base_url`].
    ///
    /// The API key is read from LLM_API_KEY only and never from files.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("COLLOQUY")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.origins")
                    .try_parsing(true),
            )
            .set_override_option(
                "llm.base_url",
                std::env::var("LLAMA_BASE_URL")
                    .ok()
                    .map(|url| llama_stack_base_url(&url)),
            )?
            .set_override_option("llm.model", std::env::var("LLAMA_MODEL_ID").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?;

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        cfg.llm_api_key = std::env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty());

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn chat_settings(&self) -> ChatSettings {
        let mut options = ChatOptions::new();
        options.temperature = self.llm.temperature;
        options.max_tokens = self.llm.max_tokens;

        ChatSettings::new(&self.llm.model, &self.conversation.system_prompt)
            .with_options(options)
            .with_turn_policy(self.conversation.turn_policy)
    }

    pub fn store_config(&self) -> StoreConfig {
        let conversation = &self.conversation;
        let mut store = StoreConfig::new(conversation.max_history_messages);
        if conversation.idle_ttl_secs > 0 {
            store = store.idle_ttl(Duration::from_secs(conversation.idle_ttl_secs));
        }
        if conversation.max_conversations > 0 {
            store = store.max_conversations(conversation.max_conversations);
        }
        store
    }

    /// How often idle conversations are swept; `None` when no TTL is set
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.conversation.idle_ttl_secs > 0)
            .then(|| Duration::from_secs(self.conversation.sweep_interval_secs.max(1)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [cors]
            enabled = true
            origins = ["http://localhost:3000"]

            [llm]
            base_url = "http://llama:8321/v1/openai/v1"
            model = "llama-32-8b-instruct"
            temperature = 0.5

            [conversation]
            max_history_messages = 4
            system_prompt = "Be terse."
            idle_ttl_secs = 0
            max_conversations = 0
            turn_policy = "interleave"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 300);
        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.conversation.turn_policy, TurnPolicy::Interleave);

        let store = config.store_config();
        assert_eq!(store.max_history_messages, 4);
        assert_eq!(store.idle_ttl, None);
        assert_eq!(store.max_conversations, None);
        assert_eq!(config.sweep_interval(), None);

        let settings = config.chat_settings();
        assert_eq!(settings.model_id, "llama-32-8b-instruct");
        assert_eq!(settings.system_prompt, "Be terse.");
        assert_eq!(settings.options.temperature, Some(0.5));
        assert_eq!(settings.options.max_tokens, None);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.model, "llama-32-8b-instruct");
        assert_eq!(config.conversation.max_history_messages, 20);
        assert_eq!(config.conversation.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.conversation.turn_policy, TurnPolicy::Serialize);
        assert!(config.llm_api_key.is_none());

        let store = config.store_config();
        assert_eq!(store.idle_ttl, Some(Duration::from_secs(86_400)));
        assert_eq!(store.max_conversations, Some(10_000));
        assert_eq!(config.sweep_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_llama_server_root_maps_to_openai_route() {
        assert_eq!(
            llama_stack_base_url("http://lsd-llama-milvus-inline-service:8321/"),
            "http://lsd-llama-milvus-inline-service:8321/v1/openai/v1"
        );
        assert_eq!(
            llama_stack_base_url("http://localhost:8321"),
            "http://localhost:8321/v1/openai/v1"
        );
    }

    #[test]
    fn test_llama_url_with_path_kept() {
        assert_eq!(
            llama_stack_base_url("http://localhost:8321/v1/openai/v1/"),
            "http://localhost:8321/v1/openai/v1"
        );
        assert_eq!(
            llama_stack_base_url("https://gateway.internal/llm/v1"),
            "https://gateway.internal/llm/v1"
        );
    }

    #[test]
    fn test_shipped_default_file_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let config = Config::from_file(path).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.base_url, "http://localhost:8321/v1/openai/v1");
        assert_eq!(config.conversation.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.conversation.max_conversations, 10_000);
    }
}
