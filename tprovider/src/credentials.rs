//! Opaque credential wrapper and the immutable per-run provider configuration.
//!
//! ```rust
//! use tprovider::{ProviderConfig, ProviderKind};
//!
//! let config = ProviderConfig::sse_protocol("http://localhost:1234/v1/").with_credential("sk-1");
//! assert_eq!(config.kind, ProviderKind::SseProtocol);
//! assert_eq!(config.endpoint("models"), "http://localhost:1234/v1/models");
//! assert_eq!(format!("{:?}", config.credential), "Some([REDACTED])");
//! ```

use crate::{ProviderError, ProviderKind};

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // Zeroing bytes in place keeps the String valid UTF-8.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

/// Endpoint description for one run. Providers take a copy at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    pub credential: Option<SecretString>,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, base_url: impl Into<String>) -> Self {
        Self {
            kind,
            base_url: base_url.into(),
            credential: None,
        }
    }

    pub fn line_protocol(base_url: impl Into<String>) -> Self {
        Self::new(ProviderKind::LineProtocol, base_url)
    }

    pub fn sse_protocol(base_url: impl Into<String>) -> Self {
        Self::new(ProviderKind::SseProtocol, base_url)
    }

    /// Blank credentials are treated as absent.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        let credential = credential.into();
        self.credential = if credential.trim().is_empty() {
            None
        } else {
            Some(SecretString::new(credential.trim()))
        };
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ProviderError::invalid_request("base_url must not be empty"));
        }

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ProviderError::invalid_request(format!(
                "base_url must start with http:// or https://, got `{base_url}`"
            )));
        }

        Ok(())
    }
}
