use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    /// URL prefix the stats API is mounted under. Trailing slashes are
    /// stripped at mount time.
    pub base_path: Option<String>,
    /// Filesystem root stats targets are resolved beneath.
    pub root: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api: Option<ApiSection>,
}

impl Config {
    pub fn load() -> anyhow::Result<(Self, PathBuf)> {
        let cfg_path = env::var("STATSERVE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/statserve.toml"));
        let mut cfg: Config = match fs::read_to_string(&cfg_path) {
            Ok(text) => toml::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(e.into()),
        };

        // Env overrides: STATSERVE_BASE_PATH, STATSERVE_ROOT
        if let Ok(base) = env::var("STATSERVE_BASE_PATH") {
            cfg.api
                .get_or_insert(ApiSection {
                    base_path: None,
                    root: None,
                })
                .base_path = Some(base);
        }
        if let Ok(root) = env::var("STATSERVE_ROOT") {
            cfg.api
                .get_or_insert(ApiSection {
                    base_path: None,
                    root: None,
                })
                .root = Some(root);
        }

        Ok((cfg, cfg_path))
    }

    pub fn base_path(&self) -> String {
        self.api
            .as_ref()
            .and_then(|a| a.base_path.clone())
            .unwrap_or_else(|| "/api".to_string())
    }

    pub fn root(&self) -> PathBuf {
        self.api
            .as_ref()
            .and_then(|a| a.root.as_ref())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/"))
    }
}
