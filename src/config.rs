// ABOUTME: Configuration structures and parsing for the roster location, SSH and reboot settings
// ABOUTME: The roster file path is always explicit here, never derived from how the binary was launched

use crate::ssh::command::DEFAULT_REBOOT_COMMAND;
use crate::ssh::session::DEFAULT_SSH_PORT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub ssh: SshConfig,
    #[serde(default)]
    pub reboot: RebootConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SshConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RebootConfig {
    #[serde(default = "default_reboot_command")]
    pub command: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_reboot_command() -> String {
    DEFAULT_REBOOT_COMMAND.to_string()
}

const DEFAULT_STORE_PATH: &str = "~/.fleetboot/hosts.json";

impl Default for SshConfig {
    fn default() -> Self {
        SshConfig {
            port: default_port(),
        }
    }
}

impl Default for RebootConfig {
    fn default() -> Self {
        RebootConfig {
            command: default_reboot_command(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store: StoreConfig {
                path: DEFAULT_STORE_PATH.to_string(),
            },
            ssh: SshConfig::default(),
            reboot: RebootConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn default_config_content() -> &'static str {
        r#"# fleetboot configuration

[store]
# JSON file holding the host roster (address, username, password).
# Passwords are stored in clear text; restrict access to this file.
path = "~/.fleetboot/hosts.json"

[ssh]
# Remote port used for every host
port = 22

[reboot]
# Command run on each host. {password} is replaced with that host's password.
# With passwordless sudo configured, the password can be left out:
# command = "sudo -n shutdown -r now"
command = "echo {password} | sudo -S shutdown -r now"

[logging]
# error, warn, info, debug or trace (RUST_LOG overrides this)
level = "info"
# Write JSON logs to a file instead of stderr
# file = "~/.fleetboot/fleetboot.log"
"#
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::load_from_str(&content)
    }

    /// An explicitly named file must exist. Without one, the default location
    /// is used if present and built-in defaults otherwise.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(config_dir.join("fleetboot").join("config.toml"))
    }

    pub fn expand_paths(&mut self) -> Result<()> {
        self.store.path = expand_tilde(&self.store.path)?;
        if let Some(file) = &self.logging.file {
            self.logging.file = Some(expand_tilde(file)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.path.trim().is_empty() {
            anyhow::bail!("Store path cannot be empty");
        }

        if self.ssh.port == 0 {
            anyhow::bail!("SSH port must be greater than 0");
        }

        if self.reboot.command.trim().is_empty() {
            anyhow::bail!("Reboot command cannot be empty");
        }

        Ok(())
    }

    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.store.path)
    }

    pub fn save_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config to: {}", path.display()))?;

        Ok(())
    }
}

fn expand_tilde(path: &str) -> Result<String> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(rest).to_string_lossy().into_owned())
    } else {
        Ok(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_config() {
        let config_str = r#"
[store]
path = "/var/lib/fleetboot/hosts.json"
"#;

        let config = Config::load_from_str(config_str).unwrap();

        assert_eq!(config.store.path, "/var/lib/fleetboot/hosts.json");
        assert_eq!(config.ssh.port, 22); // Default value
        assert_eq!(config.reboot.command, DEFAULT_REBOOT_COMMAND);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
[store]
path = "hosts.json"

[ssh]
port = 2222

[reboot]
command = "sudo -n reboot"

[logging]
level = "debug"
file = "/tmp/fleetboot.log"
"#;

        let config = Config::load_from_str(config_str).unwrap();

        assert_eq!(config.ssh.port, 2222);
        assert_eq!(config.reboot.command, "sudo -n reboot");
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.file.as_deref(), Some("/tmp/fleetboot.log"));
    }

    #[test]
    fn test_parse_invalid_config_missing_store() {
        let config_str = r#"
[ssh]
port = 22
"#;

        let result = Config::load_from_str(config_str);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to parse configuration"));
    }

    #[test]
    fn test_parse_invalid_config_wrong_type() {
        let config_str = r#"
[store]
path = "hosts.json"

[ssh]
port = "twenty-two"
"#;

        assert!(Config::load_from_str(config_str).is_err());
    }

    #[test]
    fn test_parse_invalid_log_level() {
        let config_str = r#"
[store]
path = "hosts.json"

[logging]
level = "loud"
"#;

        assert!(Config::load_from_str(config_str).is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();

        assert_eq!(
            expand_tilde("~/test").unwrap(),
            home.join("test").to_string_lossy()
        );
        assert_eq!(expand_tilde("/absolute/path").unwrap(), "/absolute/path");
        assert_eq!(expand_tilde("relative/path").unwrap(), "relative/path");
    }

    #[test]
    fn test_config_expand_paths() {
        let mut config = Config::default();
        config.logging.file = Some("~/logs/fleetboot.log".to_string());
        config.expand_paths().unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(
            config.store.path,
            home.join(".fleetboot/hosts.json").to_string_lossy()
        );
        let expected_log = home.join("logs/fleetboot.log").to_string_lossy().into_owned();
        assert_eq!(config.logging.file.as_deref(), Some(expected_log.as_str()));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path().unwrap();
        assert!(path.to_string_lossy().contains("fleetboot"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_validate_empty_store_path() {
        let mut config = Config::default();
        config.store.path = "  ".to_string();

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Store path cannot be empty"));
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.ssh.port = 0;

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("SSH port must be greater than 0"));
    }

    #[test]
    fn test_validate_empty_reboot_command() {
        let mut config = Config::default();
        config.reboot.command = String::new();

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Reboot command cannot be empty"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_default_config_content_can_be_parsed() {
        let content = Config::default_config_content();
        let config = Config::load_from_str(content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_default_config_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        Config::save_default_config(&path).unwrap();

        assert_eq!(Config::load_from_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_or_default_explicit_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");

        let result = Config::load_or_default(Some(&path));
        assert!(result.unwrap_err().to_string().contains("Failed to read configuration file"));
    }

    #[test]
    fn test_load_or_default_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[store]\npath = \"roster.json\"\n").unwrap();

        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.store_path(), PathBuf::from("roster.json"));
    }
}
