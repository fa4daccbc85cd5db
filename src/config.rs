//! Configuration
//!
//! Loaded from YAML. Lookup order: explicit path, `./config/pagefactory.yaml`,
//! `<config_dir>/pagefactory/config.yaml`, then built-in defaults. A few
//! `PAGEFACTORY_*` environment variables override the file.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use step_fragments::DEFAULT_MAX_DEPTH;

pub const ENV_LOG_LEVEL: &str = "PAGEFACTORY_LOG_LEVEL";
pub const ENV_PRESERVE_SESSION: &str = "PAGEFACTORY_PRESERVE_SESSION";
pub const ENV_FRAGMENT_DEPTH: &str = "PAGEFACTORY_FRAGMENT_DEPTH";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageFactoryConfig {
    /// YAML file with page definitions
    pub pages: Option<PathBuf>,
    pub fragments: FragmentsConfig,
    pub session: SessionConfig,
    pub driver: DriverConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FragmentsConfig {
    /// YAML file with fragment definitions
    pub path: Option<PathBuf>,
    pub max_depth: usize,
}

impl Default for FragmentsConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Share one driver session and page cache across scenarios
    pub preserve: bool,
    pub dismiss_alerts_on_dispose: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preserve: false,
            dismiss_alerts_on_dispose: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    /// Humantime duration, e.g. `30s` or `1m 30s`
    pub timeout: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            timeout: "30s".to_string(),
        }
    }
}

impl DriverConfig {
    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.timeout)
            .with_context(|| format!("Invalid driver timeout '{}'", self.timeout))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

pub struct LoadedConfig {
    pub config: PageFactoryConfig,
    pub path: PathBuf,
}

impl PageFactoryConfig {
    /// Relative `pages`/`fragments` paths are taken relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if let Some(pages) = self.pages.as_mut() {
            if pages.is_relative() {
                *pages = base.join(&*pages);
            }
        }
        if let Some(fragments) = self.fragments.path.as_mut() {
            if fragments.is_relative() {
                *fragments = base.join(&*fragments);
            }
        }
    }

    /// Apply `PAGEFACTORY_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = env::var(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Ok(raw) = env::var(ENV_PRESERVE_SESSION) {
            self.session.preserve = parse_flag(&raw).with_context(|| {
                format!("{} must be a boolean, got '{}'", ENV_PRESERVE_SESSION, raw)
            })?;
        }
        if let Ok(raw) = env::var(ENV_FRAGMENT_DEPTH) {
            self.fragments.max_depth = raw
                .trim()
                .parse()
                .with_context(|| {
                    format!("{} must be a number, got '{}'", ENV_FRAGMENT_DEPTH, raw)
                })?;
        }
        Ok(())
    }
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => {
            let local_config = PathBuf::from("config/pagefactory.yaml");
            if local_config.exists() {
                local_config
            } else {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("pagefactory");
                path.push("config.yaml");
                path
            }
        }
    };

    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let mut config: PageFactoryConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;
        if let Some(base) = config_path.parent() {
            config.resolve_paths(base);
        }
        info!("Loaded configuration from: {}", config_path.display());
        config
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        PageFactoryConfig::default()
    };

    config.apply_env_overrides()?;
    config.driver.timeout()?;

    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config: PageFactoryConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, PageFactoryConfig::default());
        assert_eq!(config.fragments.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.driver.timeout().unwrap(), Duration::from_secs(30));
        assert!(config.session.dismiss_alerts_on_dispose);
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let mut config = PageFactoryConfig {
            pages: Some(PathBuf::from("pages.yaml")),
            ..Default::default()
        };
        config.fragments.path = Some(PathBuf::from("/abs/fragments.yaml"));
        config.resolve_paths(Path::new("/etc/pf"));

        assert_eq!(config.pages, Some(PathBuf::from("/etc/pf/pages.yaml")));
        assert_eq!(config.fragments.path, Some(PathBuf::from("/abs/fragments.yaml")));
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
