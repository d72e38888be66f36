//! Parsing helpers shared by the CLI and config loader.

use crate::ProviderPreset;

pub fn parse_preset(value: &str) -> Option<ProviderPreset> {
    let normalized = value
        .trim()
        .to_ascii_lowercase()
        .replace([' ', '_'], "-");

    match normalized.as_str() {
        "ollama" => Some(ProviderPreset::Ollama),
        "lm-studio" | "lmstudio" | "lms" => Some(ProviderPreset::LmStudio),
        "other" | "openai-compatible" | "custom" => Some(ProviderPreset::Other),
        _ => None,
    }
}
