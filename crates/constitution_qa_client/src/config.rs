//! Client config load/save for `~/.constitution-qa/config.yaml`, and API base
//! URL resolution (flag, `NEXT_PUBLIC_API_URL`, file, default).

use std::path::{Path, PathBuf};

/// Backend used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Env var selecting the backend base URL.
pub const API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";

/// Env var overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "CONSTITUTION_QA_CONFIG";

/// API section (base_url).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ApiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    /// Initial document registry. Empty means the built-in default document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<String>,
}

/// Config load/save error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Returns the default config file path: `~/.constitution-qa/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".constitution-qa").join("config.yaml"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Load config from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(&contents)?)
}

/// Load config from `path` if given (must exist), otherwise from the
/// `CONSTITUTION_QA_CONFIG` path (must exist), otherwise from the default path
/// (missing file means defaults).
pub fn load_resolved(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(p) = path {
        return load(p);
    }
    if let Some(p) = std::env::var_os(CONFIG_PATH_ENV) {
        return load(Path::new(&p));
    }
    match default_config_path() {
        Some(p) if p.exists() => load(&p),
        _ => {
            tracing::debug!("no config file found; using defaults");
            Ok(Config::default())
        }
    }
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Pick the API base URL: explicit override, then `NEXT_PUBLIC_API_URL`, then
/// the config file, then [`DEFAULT_API_BASE`]. Blank values are skipped.
pub fn resolve_api_base(override_url: Option<&str>, config: &Config) -> String {
    let env = std::env::var(API_URL_ENV).ok();
    let base = [override_url, env.as_deref(), config.api.base_url.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_API_BASE)
        .to_string();
    base
}
