//! Provider presets and construction for facade consumers.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use crate::{
    DirectoryListing, ModelDirectory, ModelProvider, NoopOperationHooks, ProviderConfig,
    ProviderError, ProviderKind, ProviderOperationHooks,
};

/// Endpoint families offered to the user. LM Studio and "other" servers share the SSE
/// wire protocol and differ only in defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderPreset {
    #[default]
    Ollama,
    LmStudio,
    Other,
}

impl ProviderPreset {
    pub fn kind(self) -> ProviderKind {
        match self {
            Self::Ollama => ProviderKind::LineProtocol,
            Self::LmStudio | Self::Other => ProviderKind::SseProtocol,
        }
    }

    /// `None` means the user has to supply a base URL.
    pub fn default_base_url(self) -> Option<&'static str> {
        match self {
            Self::Ollama => Some("http://localhost:11434"),
            Self::LmStudio => Some("http://localhost:1234/v1"),
            Self::Other => None,
        }
    }

    pub fn accepts_credential(self) -> bool {
        matches!(self, Self::Other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::LmStudio => "lm-studio",
            Self::Other => "other",
        }
    }
}

impl Display for ProviderPreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderPreset {
    type Err = ProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        crate::parse_preset(value).ok_or_else(|| {
            ProviderError::invalid_request(format!(
                "unknown provider `{value}` (expected ollama, lm-studio or other)"
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderBuildConfig {
    pub preset: ProviderPreset,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl ProviderBuildConfig {
    pub fn new(preset: ProviderPreset) -> Self {
        Self {
            preset,
            base_url: None,
            api_key: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Resolves preset defaults. Credentials are dropped for presets that never send one.
    pub fn provider_config(&self) -> Result<ProviderConfig, ProviderError> {
        let base_url = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or(self.preset.default_base_url())
            .ok_or_else(|| {
                ProviderError::invalid_request(format!(
                    "provider `{}` requires a base URL",
                    self.preset
                ))
            })?;

        let mut config = ProviderConfig::new(self.preset.kind(), base_url);
        if self.preset.accepts_credential()
            && let Some(api_key) = &self.api_key
        {
            config = config.with_credential(api_key.as_str());
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn build_provider(
    config: &ProviderBuildConfig,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    build_from_provider_config(config.provider_config()?, hooks)
}

pub fn build_provider_with_defaults(
    preset: ProviderPreset,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    build_provider(
        &ProviderBuildConfig::new(preset),
        Arc::new(NoopOperationHooks),
    )
}

pub fn build_from_provider_config(
    config: ProviderConfig,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    match config.kind {
        ProviderKind::LineProtocol => build_line_provider(config, hooks),
        ProviderKind::SseProtocol => build_sse_provider(config, hooks),
    }
}

/// Fetches the directory for a freshly built provider. Construction failures surface as
/// an unavailable listing so callers can fall back to free-text model entry.
pub async fn list_models(
    config: &ProviderBuildConfig,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> DirectoryListing {
    match build_provider(config, hooks) {
        Ok(provider) => ModelDirectory::fetch(provider.as_ref()).await,
        Err(error) => DirectoryListing::unavailable(ProviderError::directory_unavailable(
            error.to_string(),
        )),
    }
}

#[cfg(feature = "provider-line")]
fn build_line_provider(
    config: ProviderConfig,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    let provider = tprovider::adapters::line::LineProtocolProvider::new(config)?.with_hooks(hooks);
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "provider-line"))]
fn build_line_provider(
    _config: ProviderConfig,
    _hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-line feature is not enabled on tandem",
    ))
}

#[cfg(feature = "provider-sse")]
fn build_sse_provider(
    config: ProviderConfig,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    let provider = tprovider::adapters::sse::SseProtocolProvider::new(config)?.with_hooks(hooks);
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "provider-sse"))]
fn build_sse_provider(
    _config: ProviderConfig,
    _hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-sse feature is not enabled on tandem",
    ))
}
