//! Model directory: listing normalization and default agent model selection.
//!
//! ```rust
//! use serde_json::json;
//! use tprovider::{DirectoryListing, normalize_models_listing, normalize_tags_listing};
//!
//! let sse = normalize_models_listing(&json!({"data": [{"id": "m1"}, {"id": "m2"}]}));
//! assert_eq!(sse, Some(vec!["m1".to_string(), "m2".to_string()]));
//!
//! let line = normalize_tags_listing(&json!({"models": [{"name": "a"}, {"name": "b"}]}));
//! assert_eq!(line, Some(vec!["a".to_string(), "b".to_string()]));
//!
//! let defaults = DirectoryListing::available(vec!["a".into(), "b".into()]).default_selection();
//! assert_eq!((defaults.agent_a.as_str(), defaults.agent_b.as_str()), ("a", "b"));
//! ```

use serde_json::Value;

use crate::{ModelProvider, ProviderError, ProviderErrorKind};

/// Normalizes a line-protocol `{"models": [{"name": ...}]}` listing.
///
/// Returns `None` when the payload does not have that shape at all.
pub fn normalize_tags_listing(value: &Value) -> Option<Vec<String>> {
    let entries = value.get("models")?.as_array()?;
    Some(
        entries
            .iter()
            .filter_map(|entry| identifier(entry, &["name"]))
            .collect(),
    )
}

/// Normalizes an SSE-protocol listing, either `{"data": [{"id": ...}]}` or a bare list of
/// objects carrying `id` (preferred) or `name`.
///
/// Returns `None` when the payload matches neither shape.
pub fn normalize_models_listing(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Object(object) => {
            let entries = object.get("data")?.as_array()?;
            Some(
                entries
                    .iter()
                    .filter_map(|entry| identifier(entry, &["id"]))
                    .collect(),
            )
        }
        Value::Array(entries) => Some(
            entries
                .iter()
                .filter_map(|entry| identifier(entry, &["id", "name"]))
                .collect(),
        ),
        _ => None,
    }
}

fn identifier(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| entry.get(*key).and_then(Value::as_str))
        .find(|id| !id.trim().is_empty())
        .map(str::to_string)
}

/// Model identifiers selected for the two agents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentModels {
    pub agent_a: String,
    pub agent_b: String,
}

impl AgentModels {
    pub fn new(agent_a: impl Into<String>, agent_b: impl Into<String>) -> Self {
        Self {
            agent_a: agent_a.into(),
            agent_b: agent_b.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.agent_a.trim().is_empty() && !self.agent_b.trim().is_empty()
    }

    /// Keeps each previous choice that the listing still offers and falls back to the
    /// listing's default for the rest. Free-text choices survive an empty listing.
    pub fn reconcile(&self, listing: &DirectoryListing) -> Self {
        if listing.requires_free_text() {
            return self.clone();
        }

        let defaults = listing.default_selection();
        let keep_or = |current: &str, fallback: String| {
            if listing.contains(current) {
                current.to_string()
            } else {
                fallback
            }
        };

        Self {
            agent_a: keep_or(&self.agent_a, defaults.agent_a),
            agent_b: keep_or(&self.agent_b, defaults.agent_b),
        }
    }
}

/// Result of asking a provider for its models. Never carries a partial list: either the
/// full normalized listing, or no models plus the reason.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryListing {
    pub models: Vec<String>,
    pub error: Option<ProviderError>,
}

impl DirectoryListing {
    pub fn available(models: Vec<String>) -> Self {
        Self {
            models,
            error: None,
        }
    }

    pub fn unavailable(error: ProviderError) -> Self {
        Self {
            models: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }

    /// With nothing to choose from, callers accept typed model identifiers instead.
    pub fn requires_free_text(&self) -> bool {
        self.models.is_empty()
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.iter().any(|candidate| candidate == model)
    }

    /// Agent A gets the first entry; agent B gets the first entry that differs from it,
    /// or the same entry when only one model is offered.
    pub fn default_selection(&self) -> AgentModels {
        let Some(first) = self.models.first() else {
            return AgentModels::default();
        };

        let second = self
            .models
            .iter()
            .find(|candidate| *candidate != first)
            .unwrap_or(first);

        AgentModels::new(first.clone(), second.clone())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ModelDirectory;

impl ModelDirectory {
    /// Lists the provider's models. Failures degrade to an empty listing with the error
    /// attached rather than propagating.
    pub async fn fetch(provider: &dyn ModelProvider) -> DirectoryListing {
        match provider.list_models().await {
            Ok(models) => DirectoryListing::available(models),
            Err(error) if error.kind == ProviderErrorKind::DirectoryUnavailable => {
                DirectoryListing::unavailable(error)
            }
            Err(error) => DirectoryListing::unavailable(ProviderError::directory_unavailable(
                error.to_string(),
            )),
        }
    }
}
