use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct TandemConfig {
    pub project: ProjectConfig,
    pub backend: BackendConfig,
    pub frontend: FrontendConfig,
    #[serde(default)]
    pub launch: LaunchConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
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
    std::env::var("TANDEM_ENV").unwrap_or_else(|_| "development".to_string())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Working directory of the backend, relative to the project directory.
    #[serde(default = "default_backend_dir")]
    pub dir: PathBuf,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub port: u16,
    /// Path polled on the backend to decide readiness (e.g. "/health").
    /// When omitted, the launcher falls back to a fixed startup delay.
    pub health_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Working directory of the frontend, relative to the project directory.
    #[serde(default = "default_frontend_dir")]
    pub dir: PathBuf,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Startup delay before the frontend is launched, used only when the
    /// backend has no health_path configured.
    #[serde(default = "default_startup_delay")]
    pub startup_delay_secs: u64,
    /// How long the readiness gate may poll before giving up.
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,
    /// Tick of the readiness gate and the supervision loop.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Per-request timeout of a single health probe.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            startup_delay_secs: default_startup_delay(),
            ready_timeout_secs: default_ready_timeout(),
            poll_interval_ms: default_poll_interval(),
            probe_timeout_ms: default_probe_timeout(),
        }
    }
}

fn default_backend_dir() -> PathBuf {
    PathBuf::from("backend")
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from("frontend")
}

fn default_startup_delay() -> u64 {
    5
}

fn default_ready_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    250
}

fn default_probe_timeout() -> u64 {
    1000
}

impl BackendConfig {
    /// The URL printed in status output once the backend is up.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// The URL polled by the readiness gate, if a health path is configured.
    pub fn health_url(&self) -> Option<String> {
        self.health_path
            .as_ref()
            .map(|p| format!("http://127.0.0.1:{}{}", self.port, p))
    }
}

impl FrontendConfig {
    /// The URL printed in status output once the frontend is up.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// Deep-merge two TOML values. The `override_val` takes precedence over `base`.
/// Tables are merged recursively; all other types are replaced.
fn deep_merge(base: toml::Value, override_val: toml::Value) -> toml::Value {
    match (base, override_val) {
        (toml::Value::Table(mut base_table), toml::Value::Table(override_table)) => {
            for (key, override_v) in override_table {
                let merged = if let Some(base_v) = base_table.remove(&key) {
                    deep_merge(base_v, override_v)
                } else {
                    override_v
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        // For non-table types, the override wins
        (_base, override_val) => override_val,
    }
}

impl TandemConfig {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("tandem.toml");
        let content = std::fs::read_to_string(&path)?;
        let config: TandemConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with environment-specific overrides.
    ///
    /// 1. Loads base `tandem.toml`
    /// 2. Determines the active environment from `TANDEM_ENV`
    ///    (or from `[environment] active` in the base config), defaulting to "development"
    /// 3. If `tandem.{env}.toml` exists (e.g. `tandem.production.toml`),
    ///    deep-merges those overrides on top of the base config
    pub fn load_with_env(dir: &Path) -> Result<Self> {
        let base_path = dir.join("tandem.toml");
        let base_content = std::fs::read_to_string(&base_path)?;
        let base_value: toml::Value = toml::from_str(&base_content)?;

        // Determine active environment: TANDEM_ENV takes priority, then config field
        let env_name = std::env::var("TANDEM_ENV").unwrap_or_else(|_| {
            base_value
                .get("environment")
                .and_then(|e| e.get("active"))
                .and_then(|a| a.as_str())
                .unwrap_or("development")
                .to_string()
        });

        let env_path = dir.join(format!("tandem.{}.toml", env_name));
        let merged_value = if env_path.exists() {
            let env_content = std::fs::read_to_string(&env_path)?;
            let env_value: toml::Value = toml::from_str(&env_content)?;
            deep_merge(base_value, env_value)
        } else {
            base_value
        };

        let config: TandemConfig = merged_value.try_into()?;
        Ok(config)
    }

    /// Reject configs the launcher cannot meaningfully run.
    pub fn validate(&self) -> Result<()> {
        if self.backend.command.trim().is_empty() {
            anyhow::bail!("backend command is empty in tandem.toml");
        }
        if self.frontend.command.trim().is_empty() {
            anyhow::bail!("frontend command is empty in tandem.toml");
        }
        if self.backend.port == self.frontend.port {
            anyhow::bail!(
                "backend and frontend are both configured on port {}",
                self.backend.port
            );
        }
        if self.launch.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be greater than zero");
        }
        Ok(())
    }
}
