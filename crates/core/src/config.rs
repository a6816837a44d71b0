//! Configuration management for SciMentor.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.scimentor/config.yaml` or `SCIMENTOR_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Nothing here is persisted; the config is read once at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the completion factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Environment variable holding the OpenAI key when no provider config names one.
pub const DEFAULT_OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Model used for a provider that the config file does not configure.
pub fn default_model(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("gpt-3.5-turbo-instruct"),
        "ollama" => Some("llama3.2"),
        _ => None,
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory that contains `.scimentor/`
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider ("openai" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Explicit API key, overrides any provider-specific key variable
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider configurations from the config file
    pub llm: Option<LlmConfig>,

    /// Scope validation and routing settings
    pub routing: RoutingConfig,
}

/// LLM section of config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Custom endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint),
        }
    }

    /// HTTP timeout in seconds, if any.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            Self::OpenAI { timeout, .. } | Self::Ollama { timeout, .. } => *timeout,
        }
    }
}

/// Scope validation and routing settings (`routing:` in config.yaml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingConfig {
    /// Timeout budget for the single classifier completion call
    pub classifier_timeout_secs: u64,

    /// Answer language when the caller does not choose one
    pub default_language: String,

    /// Extra in-scope patterns appended to the built-in rules
    pub extra_patterns: Vec<String>,

    /// Extra organization patterns appended to the built-in rules
    pub extra_organization_patterns: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            classifier_timeout_secs: 30,
            default_language: "english".to_string(),
            extra_patterns: Vec::new(),
            extra_organization_patterns: Vec::new(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    routing: Option<RoutingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo-instruct".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            routing: RoutingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and environment variables.
    ///
    /// Environment variables:
    /// - `SCIMENTOR_WORKSPACE`: Override workspace path
    /// - `SCIMENTOR_CONFIG`: Path to config file
    /// - `SCIMENTOR_PROVIDER`: Completion provider
    /// - `SCIMENTOR_MODEL`: Model identifier
    /// - `SCIMENTOR_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use scimentor_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Provider: {}", config.provider);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// (e.g. from CLI flags) taking precedence over the environment.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) =
            workspace.or_else(|| std::env::var("SCIMENTOR_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("SCIMENTOR_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.scimentor_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("SCIMENTOR_PROVIDER") {
            config.switch_provider(provider);
        }

        if let Ok(model) = std::env::var("SCIMENTOR_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("SCIMENTOR_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into a copy of this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merging config file {:?}", path);
        Ok(self.merge_file(config_file))
    }

    fn merge_file(&self, config_file: ConfigFile) -> Self {
        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        if let Some(routing) = config_file.routing {
            result.routing = routing;
        }

        result
    }

    /// Select a provider together with its model: the one the config file
    /// sets for it, else its default. The model is kept when the provider
    /// does not change or is unknown.
    fn switch_provider(&mut self, provider: String) {
        if provider != self.provider {
            let model = self
                .get_provider_config(&provider)
                .map(|pc| pc.model().to_string())
                .or_else(|| default_model(&provider).map(str::to_string));
            if let Some(model) = model {
                self.model = model;
            }
        }
        self.provider = provider;
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.switch_provider(provider);
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Path to the `.scimentor` directory.
    pub fn scimentor_dir(&self) -> PathBuf {
        self.workspace.join(".scimentor")
    }

    /// Configuration for the given provider, if the config file has one.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Name of the environment variable that holds the provider's API key.
    fn api_key_env(&self, provider: &str) -> Option<String> {
        match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => Some(api_key_env.clone()),
            Some(ProviderConfig::Ollama { .. }) => None,
            None if provider == "openai" => Some(DEFAULT_OPENAI_KEY_ENV.to_string()),
            None => None,
        }
    }

    /// Resolve the API key: `SCIMENTOR_API_KEY` first, then the provider's key variable.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        self.api_key_env(provider)
            .and_then(|env_var| std::env::var(env_var).ok())
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if let Some(env_var) = self.api_key_env(provider) {
            if self.resolve_api_key(provider).is_none() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    env_var
                )));
            }
        }

        if self.routing.classifier_timeout_secs == 0 {
            return Err(AppError::Config(
                "routing.classifierTimeoutSecs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-3.5-turbo-instruct");
        assert_eq!(config.routing.classifier_timeout_secs, 30);
        assert_eq!(config.routing.default_language, "english");
        assert!(!config.verbose);
    }

    #[test]
    fn test_scimentor_dir() {
        let config = AppConfig::default();
        assert!(config.scimentor_dir().ends_with(".scimentor"));
    }

    #[test]
    fn test_with_overrides() {
        let overridden = AppConfig::default().with_overrides(
            None,
            None,
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_provider_override_without_model_uses_provider_default() {
        let overridden = AppConfig::default().with_overrides(
            None,
            None,
            Some("ollama".to_string()),
            None,
            None,
            false,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
    }

    #[test]
    fn test_provider_override_uses_configured_model() {
        let mut config = AppConfig::default();
        config.llm = Some(LlmConfig {
            active_provider: "openai".to_string(),
            providers: HashMap::from([(
                "ollama".to_string(),
                ProviderConfig::Ollama {
                    endpoint: "http://gpu-box:11434".to_string(),
                    model: "qwen2.5:7b".to_string(),
                    timeout: None,
                },
            )]),
        });

        let overridden =
            config.with_overrides(None, None, Some("ollama".to_string()), None, None, false, false);

        assert_eq!(overridden.model, "qwen2.5:7b");
    }

    #[test]
    fn test_same_provider_override_keeps_model() {
        let mut config = AppConfig::default();
        config.model = "gpt-4o-mini".to_string();

        let overridden =
            config.with_overrides(None, None, Some("openai".to_string()), None, None, false, false);

        assert_eq!(overridden.model, "gpt-4o-mini");
    }

    #[test]
    fn test_merge_yaml_routing_and_provider() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: http://localhost:11434
      model: llama3.2
routing:
  classifierTimeoutSecs: 5
  extraPatterns:
    - 'physics\s+lab'
logging:
  level: info
  color: false
"#,
        )
        .unwrap();

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.routing.classifier_timeout_secs, 5);
        assert_eq!(config.routing.default_language, "english");
        assert_eq!(config.routing.extra_patterns, vec![r"physics\s+lab".to_string()]);
        assert_eq!(config.log_level, Some("info".to_string()));
        assert!(config.no_color);

        let provider = config.get_provider_config("ollama").unwrap();
        assert_eq!(provider.endpoint(), Some("http://localhost:11434"));
        assert!(matches!(provider, ProviderConfig::Ollama { .. }));
    }

    #[test]
    fn test_load_with_explicit_workspace_and_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "routing:\n  defaultLanguage: indonesian\n").unwrap();

        let config =
            AppConfig::load_with(Some(dir.path().to_path_buf()), Some(path.clone())).unwrap();
        assert_eq!(config.workspace, dir.path());
        assert_eq!(config.config_file, Some(path));
        assert_eq!(config.routing.default_language, "indonesian");
    }

    #[test]
    fn test_load_with_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let result = AppConfig::load_with(
            Some(dir.path().to_path_buf()),
            Some(dir.path().join("absent.yaml")),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_yaml_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "routing: 42").unwrap();

        assert!(AppConfig::default().merge_yaml(&path).is_err());
    }

    #[test]
    fn test_openai_provider_config_is_detected() {
        let yaml = r#"
apiKeyEnv: MY_KEY
model: gpt-3.5-turbo-instruct
"#;
        let provider: ProviderConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(provider, ProviderConfig::OpenAI { .. }));
        assert_eq!(provider.endpoint(), None);
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_openai_with_explicit_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_api_key("openai"), Some("sk-test".to_string()));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        config.routing.classifier_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
