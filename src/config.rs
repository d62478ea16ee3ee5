//! Application configuration assembled from environment variables.
//!
//! # Environment variables
//!
//! - `KB_BACKEND_URL`, `KB_HTTP_TIMEOUT_SECS` = see [`ApiConfig`]
//! - `KB_STATE_DIR`          = directory for persisted flags (default `.kb-assistant`)
//! - `KB_ADMIN_PASSWORD`, `KB_ADMIN_ACTIONS_FILE` = see [`AdminConfig`]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kb_api_client::ApiConfig;
use kb_controllers::AdminConfig;

pub const DEFAULT_STATE_DIR: &str = ".kb-assistant";

const FLAGS_FILE: &str = "flags.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub state_dir: PathBuf,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api = ApiConfig::from_lookup(&lookup).context("invalid backend configuration")?;
        let admin = AdminConfig::from_lookup(&lookup).context("invalid admin configuration")?;
        let state_dir = lookup("KB_STATE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(|v| PathBuf::from(v.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));

        Ok(Self {
            api,
            state_dir,
            admin,
        })
    }

    /// File backing the persisted UI flags.
    pub fn flags_path(&self) -> PathBuf {
        Path::new(&self.state_dir).join(FLAGS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.api, ApiConfig::default());
        assert_eq!(cfg.state_dir, PathBuf::from(".kb-assistant"));
        assert_eq!(cfg.flags_path(), PathBuf::from(".kb-assistant/flags.json"));
        assert!(cfg.admin.gate.admits("admin123"));
    }

    #[test]
    fn reads_all_sections() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("KB_BACKEND_URL", "https://kb.internal/"),
            ("KB_HTTP_TIMEOUT_SECS", "5"),
            ("KB_STATE_DIR", "/tmp/kb"),
            ("KB_ADMIN_PASSWORD", "hunter2"),
        ]);
        let cfg = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.api.base_url, "https://kb.internal");
        assert_eq!(cfg.api.timeout_secs, 5);
        assert_eq!(cfg.flags_path(), PathBuf::from("/tmp/kb/flags.json"));
        assert!(cfg.admin.gate.admits("hunter2"));
    }

    #[test]
    fn bad_timeout_is_reported() {
        let err = AppConfig::from_lookup(|k| (k == "KB_HTTP_TIMEOUT_SECS").then(|| "soon".into())).unwrap_err();
        assert!(format!("{err:#}").contains("KB_HTTP_TIMEOUT_SECS"));
    }
}
