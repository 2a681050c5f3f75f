use crate::error::Result;
use crate::error_ext::ResultExt;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR: &str = ".liveroom";
const GLOBAL_CONFIG_FILE: &str = "config.toml";
const LOCAL_CONFIG_FILE: &str = "config.local.toml";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000";
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;

/// Central configuration for liveroom
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub ws_url: String,
    pub data_dir: PathBuf,
    pub reconnect: ReconnectConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            data_dir: default_data_dir(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// On-disk shape: every key is optional so files only override what they name.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_url: Option<String>,
    ws_url: Option<String>,
    data_dir: Option<PathBuf>,
    #[serde(default)]
    reconnect: ReconnectFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReconnectFile {
    max_attempts: Option<u32>,
    delay_ms: Option<u64>,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub ws_url: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Defaults, then `~/.liveroom/config.toml`, then `<workspace>/.liveroom/config.local.toml`,
    /// then explicit overrides.
    pub fn load(workspace: &Path, overrides: ConfigOverrides) -> Self {
        let mut config = Self::default();

        if let Some(home) = std::env::var_os("HOME") {
            config.merge_file(&PathBuf::from(home).join(APP_DIR).join(GLOBAL_CONFIG_FILE));
        }
        config.merge_file(&workspace.join(APP_DIR).join(LOCAL_CONFIG_FILE));
        config.apply_overrides(overrides);

        tracing::debug!(
            api_url = %config.api_url,
            ws_url = %config.ws_url,
            data_dir = %config.data_dir.display(),
            max_attempts = config.reconnect.max_attempts,
            "Configuration loaded"
        );
        config
    }

    fn merge_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match read_config_file(path) {
            Ok(file) => self.merge(file),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping invalid config file");
                crate::ui::toast(
                    crate::ui::MessageSeverity::Warning,
                    format!("Ignoring {}: {}", path.display(), e),
                );
            }
        }
    }

    fn merge(&mut self, file: ConfigFile) {
        if let Some(api_url) = file.api_url {
            self.api_url = api_url;
        }
        if let Some(ws_url) = file.ws_url {
            self.ws_url = ws_url;
        }
        if let Some(data_dir) = file.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(max_attempts) = file.reconnect.max_attempts {
            self.reconnect.max_attempts = max_attempts;
        }
        if let Some(delay_ms) = file.reconnect.delay_ms {
            self.reconnect.delay = Duration::from_millis(delay_ms);
        }
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(api_url) = overrides.api_url {
            self.api_url = api_url;
        }
        if let Some(ws_url) = overrides.ws_url {
            self.ws_url = ws_url;
        }
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir = data_dir;
        }
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(toml::from_str(&content)?)
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.ws_url, DEFAULT_WS_URL);
        assert_eq!(config.reconnect.max_attempts, 3);
        assert_eq!(config.reconnect.delay, Duration::from_millis(3000));
    }

    #[test]
    fn test_partial_file_only_overrides_named_keys() {
        let file: ConfigFile = toml::from_str(
            r#"
ws_url = "wss://school.example.com"

[reconnect]
max_attempts = 5
"#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.merge(file);

        assert_eq!(config.ws_url, "wss://school.example.com");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.reconnect.delay, Duration::from_millis(3000));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(toml::from_str::<ConfigFile>("colour = \"blue\"\n").is_err());
    }

    #[test]
    fn test_local_file_then_overrides() {
        let workspace = tempdir().unwrap();
        let dir = workspace.path().join(APP_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(LOCAL_CONFIG_FILE),
            "api_url = \"https://local.example.com/api\"\nws_url = \"wss://local.example.com\"\n\n[reconnect]\ndelay_ms = 250\n",
        )
        .unwrap();

        let config = AppConfig::load(
            workspace.path(),
            ConfigOverrides {
                ws_url: Some("ws://127.0.0.1:9000".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(config.api_url, "https://local.example.com/api");
        assert_eq!(config.ws_url, "ws://127.0.0.1:9000");
        assert_eq!(config.reconnect.delay, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_local_file_is_skipped() {
        let workspace = tempdir().unwrap();
        let dir = workspace.path().join(APP_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(LOCAL_CONFIG_FILE), "api_url = [not toml").unwrap();

        let config = AppConfig::load(workspace.path(), ConfigOverrides::default());
        assert_eq!(config.reconnect.max_attempts, DEFAULT_MAX_RECONNECT_ATTEMPTS);
    }
}
