use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use binance_tools::ipc::ServerInfo;
use binance_tools::upstream::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: Option<String>,
    pub tool_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: ServerInfo::default().name,
            version: None,
            tool_prefix: String::new(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply command-line overrides on top of the loaded file
    pub fn with_overrides(mut self, base_url: Option<&str>, timeout_ms: Option<u64>) -> Self {
        if let Some(url) = base_url {
            self.upstream.base_url = url.to_string();
        }
        if let Some(ms) = timeout_ms {
            self.upstream.timeout_ms = ms;
        }
        self
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default()
            .with_base_url(&self.upstream.base_url)
            .with_timeout(Duration::from_millis(self.upstream.timeout_ms));
        if let Some(agent) = &self.upstream.user_agent {
            config.user_agent = agent.clone();
        }
        config
    }

    pub fn server_info(&self) -> ServerInfo {
        let mut info = ServerInfo {
            name: self.server.name.clone(),
            ..ServerInfo::default()
        };
        if let Some(version) = &self.server.version {
            info.version = version.clone();
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.upstream.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.upstream.timeout_ms, 10_000);
        assert_eq!(config.server.name, "TradeAssistant");
        assert!(config.server.tool_prefix.is_empty());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "upstream:\n  base_url: http://localhost:9000/api/v3/\n  timeout_ms: 2500\nserver:\n  tool_prefix: bb7_"
        )
        .unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.upstream.base_url, "http://localhost:9000/api/v3/");
        assert_eq!(config.upstream.timeout_ms, 2500);
        assert_eq!(config.server.tool_prefix, "bb7_");
        // Unset sections fall back to defaults
        assert_eq!(config.server.name, "TradeAssistant");
        assert!(config.upstream.user_agent.is_none());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "upstream: [not, a, map]").unwrap();
        assert!(Config::load(Some(&file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let config = Config::default().with_overrides(Some("http://127.0.0.1:1/"), Some(50));
        let client = config.client_config();
        assert_eq!(client.base_url, "http://127.0.0.1:1/");
        assert_eq!(client.timeout, Duration::from_millis(50));
    }

    #[test]
    fn test_no_overrides_keep_file_values() {
        let mut config = Config::default();
        config.upstream.timeout_ms = 1234;
        let config = config.with_overrides(None, None);
        assert_eq!(config.upstream.timeout_ms, 1234);
    }

    #[test]
    fn test_user_agent_override() {
        let mut config = Config::default();
        config.upstream.user_agent = Some("probe/1.0".to_string());
        assert_eq!(config.client_config().user_agent, "probe/1.0");
    }

    #[test]
    fn test_server_info() {
        let mut config = Config::default();
        config.server.name = "Desk".to_string();
        config.server.version = Some("9.9.9".to_string());
        let info = config.server_info();
        assert_eq!(info.name, "Desk");
        assert_eq!(info.version, "9.9.9");
    }
}
