//! Configuration management.

use serde::Deserialize;
use std::path::PathBuf;

use crate::store::DEFAULT_MEMORY_FILE;

/// Main configuration for the curator.
#[derive(Debug, Clone)]
pub struct CuratorConfig {
    /// Path to the memory document.
    pub memory_path: PathBuf,
    /// Default path for Markdown exports.
    pub export_path: PathBuf,
    /// LLM provider configuration.
    pub llm: LlmConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    /// Provider name: "gemini" or "ollama".
    pub provider: LlmProviderKind,
    /// Model name.
    pub model: Option<String>,
    /// API key (falls back to `GOOGLE_API_KEY` for Gemini).
    pub api_key: Option<String>,
    /// Base URL for the provider (for self-hosted or proxied endpoints).
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

/// Available LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProviderKind {
    /// Google Gemini (the default; requires `GOOGLE_API_KEY`).
    #[default]
    Gemini,
    /// Ollama (local; no credential).
    Ollama,
}

impl LlmProviderKind {
    /// Parses a provider string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ollama" => Self::Ollama,
            _ => Self::Gemini,
        }
    }

    /// Whether this provider needs an API credential at startup.
    #[must_use]
    pub const fn requires_credentials(self) -> bool {
        matches!(self, Self::Gemini)
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Memory document path.
    pub memory_path: Option<String>,
    /// Export path.
    pub export_path: Option<String>,
    /// LLM configuration.
    pub llm: Option<ConfigFileLlm>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLlm {
    /// Provider name.
    pub provider: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Base URL.
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            memory_path: PathBuf::from(DEFAULT_MEMORY_FILE),
            export_path: PathBuf::from(crate::export::DEFAULT_EXPORT_FILE),
            llm: LlmConfig::default(),
        }
    }
}

impl CuratorConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/curator/` on macOS)
    /// 2. XDG config dir (`~/.config/curator/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found. Environment
    /// overrides are applied either way.
    #[must_use]
    pub fn load_default() -> Self {
        Self::load_from_default_paths().with_env_overrides()
    }

    fn load_from_default_paths() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join("curator").join("config.toml");
        if platform_config.exists() {
            if let Ok(config) = Self::load_from_file(&platform_config) {
                return config;
            }
        }

        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("curator")
            .join("config.toml");
        if xdg_config.exists() {
            if let Ok(config) = Self::load_from_file(&xdg_config) {
                return config;
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `CuratorConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(memory_path) = file.memory_path {
            config.memory_path = PathBuf::from(memory_path);
        }
        if let Some(export_path) = file.export_path {
            config.export_path = PathBuf::from(export_path);
        }
        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                config.llm.provider = LlmProviderKind::parse(&provider);
            }
            config.llm.model = llm.model;
            config.llm.api_key = llm.api_key;
            config.llm.base_url = llm.base_url;
            config.llm.timeout_ms = llm.timeout_ms;
            config.llm.connect_timeout_ms = llm.connect_timeout_ms;
        }

        config
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var("CURATOR_MEMORY_PATH") {
            if !path.trim().is_empty() {
                self.memory_path = PathBuf::from(path);
            }
        }
        if let Ok(provider) = std::env::var("CURATOR_LLM_PROVIDER") {
            if !provider.trim().is_empty() {
                self.llm.provider = LlmProviderKind::parse(&provider);
            }
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = std::env::var("GOOGLE_API_KEY").ok();
        }
        self
    }

    /// Sets the memory document path.
    #[must_use]
    pub fn with_memory_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.memory_path = path.into();
        self
    }

    /// Verifies the configured provider's credential is present.
    ///
    /// Both front-ends call this before serving: a missing credential is a
    /// fatal startup error per the error taxonomy.
    ///
    /// # Errors
    ///
    /// `MissingCredentials` when the provider requires a key and none is
    /// configured.
    pub fn require_credentials(&self) -> crate::Result<()> {
        if self.llm.provider.requires_credentials()
            && self.llm.api_key.as_deref().is_none_or(|k| k.trim().is_empty())
        {
            return Err(crate::Error::MissingCredentials(
                "GOOGLE_API_KEY is not configured (set the environment variable or llm.api_key)"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CuratorConfig::default();
        assert_eq!(config.memory_path, PathBuf::from(DEFAULT_MEMORY_FILE));
        assert_eq!(config.llm.provider, LlmProviderKind::Gemini);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProviderKind::parse("ollama"), LlmProviderKind::Ollama);
        assert_eq!(LlmProviderKind::parse("OLLAMA"), LlmProviderKind::Ollama);
        assert_eq!(LlmProviderKind::parse("gemini"), LlmProviderKind::Gemini);
        // Unknown providers fall back to the default
        assert_eq!(LlmProviderKind::parse("other"), LlmProviderKind::Gemini);
    }

    #[test]
    fn test_from_config_file() {
        let file: ConfigFile = toml::from_str(
            r#"
            memory_path = "/tmp/mem.json"
            export_path = "/tmp/out.md"

            [llm]
            provider = "ollama"
            model = "mistral"
            timeout_ms = 10000
            "#,
        )
        .unwrap();

        let config = CuratorConfig::from_config_file(file);
        assert_eq!(config.memory_path, PathBuf::from("/tmp/mem.json"));
        assert_eq!(config.export_path, PathBuf::from("/tmp/out.md"));
        assert_eq!(config.llm.provider, LlmProviderKind::Ollama);
        assert_eq!(config.llm.model.as_deref(), Some("mistral"));
        assert_eq!(config.llm.timeout_ms, Some(10_000));
    }

    #[test]
    fn test_require_credentials_gemini_missing() {
        let config = CuratorConfig::default();
        // Default provider is Gemini with no key configured in the struct
        if config.llm.api_key.is_none() {
            assert!(matches!(
                config.require_credentials(),
                Err(crate::Error::MissingCredentials(_))
            ));
        }
    }

    #[test]
    fn test_require_credentials_gemini_present() {
        let mut config = CuratorConfig::default();
        config.llm.api_key = Some("test-key".to_string());
        assert!(config.require_credentials().is_ok());
    }

    #[test]
    fn test_require_credentials_ollama_never_needed() {
        let mut config = CuratorConfig::default();
        config.llm.provider = LlmProviderKind::Ollama;
        config.llm.api_key = None;
        assert!(config.require_credentials().is_ok());
    }
}
