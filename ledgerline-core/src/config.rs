//! Configuration management
//!
//! `settings.json` in the data directory:
//! ```json
//! {
//!   "registrar": { "timeoutSecs": 30 },
//!   "callerCertificate": "/home/me/.ledgerline/caller.pem"
//! }
//! ```
//! Keys this crate does not know about are preserved on save.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `callerCertificate`
pub const CALLER_CERT_ENV: &str = "LEDGERLINE_CALLER_CERT";

/// Setting keys accepted by `Config::set`
pub const TIMEOUT_KEY: &str = "registrar.timeoutSecs";
pub const CALLER_CERT_KEY: &str = "callerCertificate";

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    registrar: RegistrarSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caller_certificate: Option<PathBuf>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrarSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Ledgerline configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Client-side timeout for registrar calls; `None` waits indefinitely
    pub registrar_timeout_secs: Option<u64>,
    /// Default caller certificate for identity operations
    pub caller_certificate: Option<PathBuf>,
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing file yields defaults. `LEDGERLINE_CALLER_CERT` takes
    /// precedence over the file's `callerCertificate`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(data_dir)?;
        if let Some(path) = std::env::var_os(CALLER_CERT_ENV).filter(|v| !v.is_empty()) {
            config.caller_certificate = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    /// Settings exactly as stored, without environment overrides
    pub fn load_file(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;
        Ok(Self {
            registrar_timeout_secs: raw.registrar.timeout_secs,
            caller_certificate: raw.caller_certificate,
        })
    }

    /// Update one setting by its settings.json key; `none` clears it
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let cleared = value.is_empty() || value.eq_ignore_ascii_case("none");
        match key {
            TIMEOUT_KEY => {
                self.registrar_timeout_secs = if cleared {
                    None
                } else {
                    Some(value.parse().with_context(|| {
                        format!("{} must be a whole number of seconds, got {:?}", key, value)
                    })?)
                };
            }
            CALLER_CERT_KEY => {
                self.caller_certificate = (!cleared).then(|| PathBuf::from(value));
            }
            other => bail!(
                "Unknown setting {:?} (expected {} or {})",
                other,
                TIMEOUT_KEY,
                CALLER_CERT_KEY
            ),
        }
        Ok(())
    }

    /// Save config, keeping settings this crate does not manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;
        settings.registrar.timeout_secs = self.registrar_timeout_secs;
        settings.caller_certificate = self.caller_certificate.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        let path = data_dir.join(SETTINGS_FILE);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn registrar_timeout(&self) -> Option<Duration> {
        self.registrar_timeout_secs.map(Duration::from_secs)
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let path = data_dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(SettingsFile::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!("ignoring malformed {}: {}", path.display(), e);
        SettingsFile::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.registrar_timeout().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let config = Config {
            registrar_timeout_secs: Some(12),
            caller_certificate: Some(PathBuf::from("/tmp/caller.pem")),
        };
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.registrar_timeout(), Some(Duration::from_secs(12)));
        // Env override only applies when set; tests never set it
        if std::env::var_os(CALLER_CERT_ENV).is_none() {
            assert_eq!(loaded.caller_certificate, config.caller_certificate);
        }
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"registrar": {"timeoutSecs": 5, "proxy": "none"}, "theme": "dark"}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.registrar_timeout_secs = None;
        config.save(dir.path()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap())
                .unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw["registrar"]["proxy"], "none");
        assert!(raw["registrar"].get("timeoutSecs").is_none());
    }

    #[test]
    fn test_set_then_save() {
        let dir = tempdir().unwrap();
        let mut config = Config::load_file(dir.path()).unwrap();
        config.set(TIMEOUT_KEY, "15").unwrap();
        config.set(CALLER_CERT_KEY, "/etc/ledgerline/caller.pem").unwrap();
        config.save(dir.path()).unwrap();

        let loaded = Config::load_file(dir.path()).unwrap();
        assert_eq!(loaded.registrar_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(
            loaded.caller_certificate.as_deref(),
            Some(Path::new("/etc/ledgerline/caller.pem"))
        );

        let mut config = loaded;
        config.set(TIMEOUT_KEY, "none").unwrap();
        config.set(CALLER_CERT_KEY, "").unwrap();
        assert!(config.registrar_timeout_secs.is_none());
        assert!(config.caller_certificate.is_none());
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = Config::default();
        assert!(config.set(TIMEOUT_KEY, "soon").is_err());
        assert!(config.set(TIMEOUT_KEY, "-1").is_err());
        assert!(config.set("registrar.url", "x").is_err());
        assert!(config.registrar_timeout_secs.is_none());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.registrar_timeout_secs.is_none());
    }
}
