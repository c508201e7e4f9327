use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;

use crate::paths::home_dir::resolve_home_dir;

/// Environment prefix for overrides, e.g. `CARDCTL__CLIENT__API_BASE_URL`.
pub const ENV_PREFIX: &str = "CARDCTL__";

const HOME_SUBDIR: &str = ".cardctl";

/// Main application configuration with strongly-typed sections.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Card portal client settings.
    pub client: ClientConfig,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub home_dir: String, // will be normalized to absolute path
    /// Base URL every API path is appended to.
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Request timeout in seconds; 0 disables it.
    #[serde(default)]
    pub timeout_sec: u64,
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    pub file: String,          // "logs/cardctl.log"
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_size_mb: Option<u64>, // Max size of the file in MB
}

fn default_page_size() -> u32 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            // Empty => $HOME/.cardctl
            home_dir: String::new(),
            api_base_url: "http://localhost:8081/api".to_string(),
            page_size: default_page_size(),
            timeout_sec: 0,
        }
    }
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "warn".to_string(),
            file: "logs/cardctl.log".to_string(),
            file_level: "debug".to_string(),
            max_size_mb: Some(20),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            logging: Some(default_logging_config()),
        }
    }
}

impl AppConfig {
    /// Defaults, then the YAML file, then `CARDCTL__*` variables.
    ///
    /// The file must exist. `logging` stays `None` unless the file or the
    /// environment provides it, so a config without logging gets no log files.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();
        if !path.is_file() {
            anyhow::bail!("config file not found: {}", path.display());
        }

        let base = AppConfig {
            client: ClientConfig::default(),
            logging: None,
        };
        let figment = Figment::from(Serialized::defaults(base)).merge(Yaml::file(path));

        Self::finish(figment)
            .with_context(|| format!("Failed to parse yaml config {}", path.display()))
    }

    /// Load `config_path` if given, otherwise built-in defaults plus the environment.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => Self::finish(Figment::from(Serialized::defaults(Self::default())))
                .context("Failed to extract config from environment"),
        }
    }

    fn finish(figment: Figment) -> Result<Self> {
        let mut config: AppConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.client.home_dir = normalize_home_dir(&config.client.home_dir)?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// `--api-url` replaces the base URL; each `-v` raises the default console level.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(url) = &args.api_url {
            self.client.api_base_url = url.clone();
        }

        let Some(level) = verbosity_level(args.verbose) else {
            return;
        };
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(section) = logging.get_mut("default") {
            section.console_level = level.to_string();
        }
    }

    pub fn home_dir(&self) -> &Path {
        Path::new(&self.client.home_dir)
    }
}

/// Command line arguments that influence configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub api_url: Option<String>,
    pub print_config: bool,
    pub verbose: u8,
}

fn verbosity_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Blank means `$HOME/.cardctl`. The directory is created if missing.
fn normalize_home_dir(configured: &str) -> Result<String> {
    let configured = Some(configured.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let resolved: PathBuf = resolve_home_dir(configured, HOME_SUBDIR, true)
        .context("Failed to resolve client.home_dir")?;
    Ok(resolved.to_string_lossy().into_owned())
}
