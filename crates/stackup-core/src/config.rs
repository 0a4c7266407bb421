use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "stackup.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

/// Only the `[environment]` table of the base file, read before overlays are
/// chosen.
#[derive(Debug, Deserialize)]
struct EnvironmentSection {
    #[serde(default)]
    environment: EnvironmentConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Active environment: "development", "staging", "production"
    #[serde(default = "default_environment")]
    pub active: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            active: default_environment(),
        }
    }
}

fn default_environment() -> String {
    std::env::var("STACKUP_ENV").unwrap_or_else(|_| "development".to_string())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Relative to the project root.
    #[serde(default = "default_backend_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_backend_program")]
    pub program: String,
    #[serde(default = "default_backend_args")]
    pub args: Vec<String>,
    /// Relative to the backend directory.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            dir: default_backend_dir(),
            program: default_backend_program(),
            args: default_backend_args(),
            log_file: default_log_file(),
            env: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Relative to the project root.
    #[serde(default = "default_frontend_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_frontend_program")]
    pub program: String,
    #[serde(default = "default_frontend_args")]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            dir: default_frontend_dir(),
            program: default_frontend_program(),
            args: default_frontend_args(),
            env: BTreeMap::new(),
        }
    }
}

fn default_backend_dir() -> PathBuf {
    PathBuf::from("backend")
}

fn default_backend_program() -> String {
    "python".to_string()
}

fn default_backend_args() -> Vec<String> {
    vec!["app.py".to_string()]
}

fn default_log_file() -> PathBuf {
    PathBuf::from("backend.log")
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from("frontend")
}

fn default_frontend_program() -> String {
    "npm".to_string()
}

fn default_frontend_args() -> Vec<String> {
    vec!["start".to_string()]
}

/// Deep-merge two TOML values. The `override_val` takes precedence over `base`.
/// Tables are merged recursively; all other types are replaced.
fn deep_merge(base: toml::Value, override_val: toml::Value) -> toml::Value {
    match (base, override_val) {
        (toml::Value::Table(mut base_table), toml::Value::Table(override_table)) => {
            for (key, override_v) in override_table {
                let merged = match base_table.remove(&key) {
                    Some(base_v) => deep_merge(base_v, override_v),
                    None => override_v,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_base, override_val) => override_val,
    }
}

impl StackConfig {
    /// Load config with environment-specific overrides.
    ///
    /// 1. Loads base `stackup.toml` (an absent file counts as empty, which
    ///    yields the built-in defaults)
    /// 2. Determines the active environment from `STACKUP_ENV`, then from
    ///    `[environment] active`, defaulting to "development"
    /// 3. If `stackup.{env}.toml` exists, deep-merges it over the base
    ///
    /// The returned `environment.active` is the environment actually used.
    pub fn load_with_env(dir: &Path) -> Result<Self> {
        let base_path = dir.join(CONFIG_FILE);
        let base_value: toml::Value = if base_path.exists() {
            let content = std::fs::read_to_string(&base_path)
                .with_context(|| format!("cannot read {}", base_path.display()))?;
            toml::from_str(&content).with_context(|| format!("invalid {}", base_path.display()))?
        } else {
            toml::Value::Table(toml::Table::new())
        };

        // STACKUP_ENV wins over the file; the serde default covers the rest.
        let section: EnvironmentSection = base_value.clone().try_into()?;
        let env_name = std::env::var("STACKUP_ENV").unwrap_or(section.environment.active);

        let env_path = dir.join(format!("stackup.{}.toml", env_name));
        let merged_value = if env_path.exists() {
            let env_content = std::fs::read_to_string(&env_path)
                .with_context(|| format!("cannot read {}", env_path.display()))?;
            let env_value: toml::Value = toml::from_str(&env_content)
                .with_context(|| format!("invalid {}", env_path.display()))?;
            deep_merge(base_value, env_value)
        } else {
            base_value
        };

        let mut config: StackConfig = merged_value.try_into()?;
        config.environment.active = env_name;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.backend.program.trim().is_empty() {
            bail!("[backend] program must not be empty");
        }
        if self.frontend.program.trim().is_empty() {
            bail!("[frontend] program must not be empty");
        }
        Ok(())
    }

    /// Backend working directory resolved against `root`.
    pub fn backend_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.backend.dir)
    }

    /// Frontend working directory resolved against `root`.
    pub fn frontend_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.frontend.dir)
    }

    /// Log artifact path; relative `log_file` values live inside the backend dir.
    pub fn log_path(&self, root: &Path) -> PathBuf {
        self.backend_dir(root).join(&self.backend.log_file)
    }
}
