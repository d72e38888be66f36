//! File-backed run configuration.
//!
//! Every field is optional. Missing values fall back to preset defaults, and CLI flags
//! override whatever the file provides.
//!
//! ```rust
//! use tandem::TandemConfig;
//!
//! let config = TandemConfig::from_toml_str(
//!     r#"
//!     provider = "lm-studio"
//!     agent_a_model = "qwen2.5"
//!     turn_limit_minutes = 0
//!     "#,
//! )
//! .expect("valid config");
//!
//! assert_eq!(config.turn_limit(), tandem::TurnLimit::unlimited());
//! ```

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;

use serde::Deserialize;

use crate::{AgentModels, DirectoryListing, ProviderBuildConfig, ProviderPreset, Session, TurnLimit};

pub const DEFAULT_TURN_LIMIT_MINUTES: u64 = 10;

pub const DEFAULT_SYSTEM_PROMPT: &str = "Chat like friends about any topic. Keep it casual, light, sometimes funny. Stay safe and respectful.";

pub const API_KEY_ENV: &str = "TANDEM_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    Io,
    Parse,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Invalid, message)
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ConfigError {}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TandemConfig {
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub agent_a_model: Option<String>,
    pub agent_b_model: Option<String>,
    pub topic: Option<String>,
    pub turn_limit_minutes: Option<u64>,
    pub system_prompt: Option<String>,
}

impl TandemConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            ConfigError::new(
                ConfigErrorKind::Io,
                format!("failed to read {}: {err}", path.display()),
            )
        })?;

        Self::from_toml_str(&content).map_err(|err| {
            ConfigError::new(err.kind, format!("{}: {}", path.display(), err.message))
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|err| ConfigError::new(ConfigErrorKind::Parse, err.to_string()))
    }

    /// Layers `overrides` on top of `self`; any field set in `overrides` wins.
    pub fn merge(self, overrides: TandemConfig) -> Self {
        Self {
            provider: overrides.provider.or(self.provider),
            base_url: overrides.base_url.or(self.base_url),
            api_key: overrides.api_key.or(self.api_key),
            agent_a_model: overrides.agent_a_model.or(self.agent_a_model),
            agent_b_model: overrides.agent_b_model.or(self.agent_b_model),
            topic: overrides.topic.or(self.topic),
            turn_limit_minutes: overrides.turn_limit_minutes.or(self.turn_limit_minutes),
            system_prompt: overrides.system_prompt.or(self.system_prompt),
        }
    }

    pub fn preset(&self) -> Result<ProviderPreset, ConfigError> {
        match self.provider.as_deref() {
            None => Ok(ProviderPreset::default()),
            Some(value) => crate::parse_preset(value).ok_or_else(|| {
                ConfigError::invalid(format!(
                    "unknown provider `{value}` (expected ollama, lm-studio or other)"
                ))
            }),
        }
    }

    pub fn provider_build_config(&self) -> Result<ProviderBuildConfig, ConfigError> {
        let mut build = ProviderBuildConfig::new(self.preset()?);
        if let Some(base_url) = &self.base_url {
            build = build.with_base_url(base_url.as_str());
        }
        if let Some(api_key) = &self.api_key {
            build = build.with_api_key(api_key.as_str());
        }

        build
            .provider_config()
            .map_err(|err| ConfigError::invalid(err.message))?;
        Ok(build)
    }

    pub fn turn_limit(&self) -> TurnLimit {
        TurnLimit::minutes(
            self.turn_limit_minutes
                .unwrap_or(DEFAULT_TURN_LIMIT_MINUTES),
        )
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Models named explicitly. Blank entries stay blank so the directory can fill them.
    pub fn agent_models(&self) -> AgentModels {
        AgentModels::new(
            self.agent_a_model.as_deref().unwrap_or_default().trim(),
            self.agent_b_model.as_deref().unwrap_or_default().trim(),
        )
    }

    /// Configured models carried over to `listing`: a model the listing no longer offers
    /// falls back to the listing default for that agent.
    pub fn listed_models(&self, listing: &DirectoryListing) -> AgentModels {
        self.agent_models().reconcile(listing)
    }

    pub fn session(&self, models: AgentModels) -> Session {
        Session::new(models, self.system_prompt(), self.turn_limit())
    }
}

impl Debug for TandemConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TandemConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("agent_a_model", &self.agent_a_model)
            .field("agent_b_model", &self.agent_b_model)
            .field("topic", &self.topic)
            .field("turn_limit_minutes", &self.turn_limit_minutes)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}
