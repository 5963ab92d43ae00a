use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration file structure
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DashConfig {
    /// Namespace whose MCIs the dashboard watches
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Refresh tick interval in milliseconds
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Whether the refresh timer starts enabled
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
}

fn default_namespace() -> String {
    "default".into()
}
fn default_refresh_interval_ms() -> u64 {
    5000
}
fn default_true() -> bool {
    true
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            refresh_interval_ms: default_refresh_interval_ms(),
            auto_refresh: default_true(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    InvalidInterval { interval_ms: u64 },
    NotFound { searched: Vec<PathBuf> },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Yaml(e) => write!(f, "YAML parse error: {}", e),
            Self::InvalidInterval { interval_ms } => {
                write!(f, "refresh interval too short: {}ms (minimum 100ms)", interval_ms)
            }
            Self::NotFound { searched } => {
                write!(f, "no config file found, searched: {:?}", searched)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl DashConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: DashConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search for a config file in standard locations
    pub fn discover(start_dir: &Path) -> Result<(PathBuf, Self), ConfigError> {
        let names = ["mcidash.yaml", "mcidash.yml", ".mcidash.yaml", ".mcidash.yml"];
        let mut searched = Vec::new();

        // Check environment variable first
        if let Ok(env_path) = std::env::var("MCIDASH_CONFIG") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Ok((path.clone(), Self::load(&path)?));
            }
            searched.push(path);
        }

        // Search current directory and parents
        let mut dir = Some(start_dir);
        while let Some(current) = dir {
            for name in &names {
                let path = current.join(name);
                if path.exists() {
                    return Ok((path.clone(), Self::load(&path)?));
                }
                searched.push(path);
            }
            dir = current.parent();
        }

        Err(ConfigError::NotFound { searched })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        // Sub-100ms polling would hammer the orchestration API for no gain
        if self.refresh_interval_ms < 100 {
            return Err(ConfigError::InvalidInterval {
                interval_ms: self.refresh_interval_ms,
            });
        }
        Ok(())
    }
}
