//! Orchestrator Configuration - workspace, generator and file contract as TOML values
//!
//! Each section implements `Default` with the values the plotting tool's
//! file contract expects, so a missing config file means zero-change behavior.

use super::defaults;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one orchestrator deployment.
///
/// Load with `OrchestratorConfig::load()` which searches:
/// 1. `$WELL_SCHEMATIC_CONFIG` env var
/// 2. `./well_schematic.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrchestratorConfig {
    /// Directory shared with the plotting tool
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// External plotting executable
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Output settling policy
    #[serde(default)]
    pub settle: SettleConfig,

    /// Fixed file names of the tool's file contract
    #[serde(default)]
    pub files: FilesConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl OrchestratorConfig {
    /// Load configuration using the standard search order:
    /// 1. `$WELL_SCHEMATIC_CONFIG` environment variable
    /// 2. `./well_schematic.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from env, falling back");
                    }
                }
            } else {
                warn!(path = %path, "Config env var points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(path = %local.display(), "Loaded local config");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load local config, using defaults");
                }
            }
        }

        info!("No config file found, using built-in defaults");
        Self::default()
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Build a default config rooted at `dir`. Handy for tests and embedding.
    pub fn for_workspace(dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace: WorkspaceConfig { dir: dir.into() },
            ..Self::default()
        }
    }

    /// Serialize the config to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check the config for values the pipeline cannot run with.
    ///
    /// Collects every problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.generator.timeout_secs == 0 {
            errors.push("generator.timeout_secs must be greater than 0".to_string());
        }
        if self.generator.program.as_os_str().is_empty() {
            errors.push("generator.program must not be empty".to_string());
        }
        if self.settle.poll_interval_ms == 0 {
            errors.push("settle.poll_interval_ms must be greater than 0".to_string());
        }
        if self.settle.max_wait_ms < self.settle.poll_interval_ms {
            errors.push(format!(
                "settle.max_wait_ms ({}) must be at least settle.poll_interval_ms ({})",
                self.settle.max_wait_ms, self.settle.poll_interval_ms
            ));
        }

        let f = &self.files;
        for (key, name) in [
            ("files.input", &f.input),
            ("files.backup", &f.backup),
            ("files.primary_image", &f.primary_image),
            ("files.report", &f.report),
        ] {
            Self::check_file_name(key, name, &mut errors);
        }
        for name in &f.outputs {
            Self::check_file_name("files.outputs", name, &mut errors);
        }

        if f.input == f.backup {
            errors.push(format!("files.backup must differ from files.input ('{}')", f.input));
        }
        if !f.outputs.iter().any(|o| o == &f.primary_image) {
            errors.push(format!(
                "files.outputs must include files.primary_image ('{}')",
                f.primary_image
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// File names must be a single plain component inside the workspace.
    fn check_file_name(key: &str, name: &str, errors: &mut Vec<String>) {
        if !is_plain_file_name(name) {
            errors.push(format!("{key}: '{name}' must be a plain file name"));
        }
    }

    // ------------------------------------------------------------------------
    // Resolved paths
    // ------------------------------------------------------------------------

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace.dir
    }

    pub fn input_path(&self) -> PathBuf {
        self.workspace.dir.join(&self.files.input)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.workspace.dir.join(&self.files.backup)
    }

    pub fn primary_image_path(&self) -> PathBuf {
        self.workspace.dir.join(&self.files.primary_image)
    }

    /// Generator location; relative programs resolve against the workspace.
    pub fn generator_path(&self) -> PathBuf {
        if self.generator.program.is_absolute() {
            self.generator.program.clone()
        } else {
            self.workspace.dir.join(&self.generator.program)
        }
    }
}

/// True when `name` is exactly one normal path component (no separators, no `..`).
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceConfig {
    /// Directory holding the staged input, the tool's outputs and the archives
    #[serde(default = "default_workspace_dir")]
    pub dir: PathBuf,
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self { dir: default_workspace_dir() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Executable path, relative to the workspace unless absolute
    pub program: PathBuf,
    /// Extra command-line arguments
    pub args: Vec<String>,
    /// Wall-clock budget before the process is killed
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(defaults::GENERATOR_PROGRAM),
            args: Vec::new(),
            timeout_secs: defaults::GENERATOR_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SettleConfig {
    pub poll_interval_ms: u64,
    pub max_wait_ms: u64,
}

impl SettleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: defaults::SETTLE_POLL_INTERVAL_MS,
            max_wait_ms: defaults::SETTLE_MAX_WAIT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilesConfig {
    pub input: String,
    pub backup: String,
    pub primary_image: String,
    pub report: String,
    /// Artifacts moved into each archive folder, when present
    pub outputs: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            input: defaults::INPUT_FILE.to_string(),
            backup: defaults::BACKUP_FILE.to_string(),
            primary_image: defaults::PRIMARY_IMAGE.to_string(),
            report: defaults::REPORT_FILE.to_string(),
            outputs: defaults::OUTPUT_FILES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: defaults::SERVER_ADDR.to_string(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
