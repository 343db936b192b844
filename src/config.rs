//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::advisor::model::ServiceType;
use crate::advisor::tips::LoadingTips;
use crate::error::ConfigError;

/// Hard ceiling on the number of questions in one conversation.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Store keys for the last recommendation of each segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub personal: String,
    pub corporate: String,
}

impl StorageKeys {
    pub fn key_for(&self, service_type: ServiceType) -> &str {
        match service_type {
            ServiceType::Individual => &self.personal,
            ServiceType::Corporate => &self.corporate,
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            personal: "project_advisor_recommendation_persona".to_string(),
            corporate: "project_advisor_recommendation_empresa".to_string(),
        }
    }
}

/// Everything the conversation controller needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    /// Maximum number of questions in the history.
    pub max_steps: usize,
    pub storage_keys: StorageKeys,
    /// Shown when a submit is attempted without an answer.
    pub validation_message: String,
    /// Shown when a fetch fails and the API supplied no error text.
    pub fallback_error_message: String,
    /// Shown when the API keeps asking past `max_steps`.
    pub step_limit_message: String,
    pub loading_tips: LoadingTips,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            storage_keys: StorageKeys::default(),
            validation_message:
                "Por favor, selecciona o escribe una respuesta antes de continuar.".to_string(),
            fallback_error_message:
                "Error al procesar tu solicitud. Por favor, inténtalo de nuevo en unos segundos."
                    .to_string(),
            step_limit_message:
                "Respuesta inesperada del servicio de recomendación.".to_string(),
            loading_tips: LoadingTips::default(),
        }
    }
}

/// Connection settings for the recommendation API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Sent as a bearer token when set.
    pub api_key: Option<SecretString>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/recommend-project".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub client: ClientConfig,
    pub conversation: ConversationSettings,
    pub db_path: PathBuf,
    pub port: u16,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            conversation: ConversationSettings::default(),
            db_path: PathBuf::from("./data/advisor.db"),
            port: 8080,
        }
    }
}

impl AdvisorConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("ADVISOR_ENDPOINT") {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    key: "ADVISOR_ENDPOINT".to_string(),
                    message: format!("expected an http(s) URL, got {endpoint:?}"),
                });
            }
            config.client.endpoint = endpoint;
        }

        config.client.api_key = lookup("ADVISOR_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        if let Some(secs) = parse_var::<u64, _>(&lookup, "ADVISOR_TIMEOUT_SECS")? {
            config.client.request_timeout = Duration::from_secs(secs);
        }

        if let Some(max_steps) = parse_var::<usize, _>(&lookup, "ADVISOR_MAX_STEPS")? {
            if max_steps == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "ADVISOR_MAX_STEPS".to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
            config.conversation.max_steps = max_steps;
        }

        if let Some(path) = lookup("ADVISOR_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(port) = parse_var::<u16, _>(&lookup, "ADVISOR_PORT")? {
            config.port = port;
        }

        if let Some(key) = lookup("ADVISOR_STORAGE_KEY_PERSONAL") {
            config.conversation.storage_keys.personal = key;
        }
        if let Some(key) = lookup("ADVISOR_STORAGE_KEY_CORPORATE") {
            config.conversation.storage_keys.corporate = key;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?}: {e}"),
            }),
    }
}
