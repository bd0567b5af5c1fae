// crates/phase-readiness-config/src/config.rs
// ============================================================================
// Module: Phase Readiness Configuration
// Description: Configuration loading and validation for Phase Readiness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: phase-readiness-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and falls back to the documented defaults, but
//! unknown keys and out-of-range values are rejected. Configuration is static
//! for the lifetime of the process; there is no hot reload.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use phase_readiness_core::EngineConfig;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "phase-readiness.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PHASE_READINESS_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum listen backlog.
pub(crate) const MIN_LISTEN_BACKLOG: u32 = 1;
/// Maximum listen backlog.
pub(crate) const MAX_LISTEN_BACKLOG: u32 = 4096;
/// Minimum per-socket receive timeout in milliseconds.
pub(crate) const MIN_SOCKET_TIMEOUT_MS: u64 = 10;
/// Maximum per-socket receive timeout in milliseconds.
pub(crate) const MAX_SOCKET_TIMEOUT_MS: u64 = 60_000;
/// Minimum accept poll interval in milliseconds.
pub(crate) const MIN_ACCEPT_POLL_MS: u64 = 10;
/// Maximum accept poll interval in milliseconds.
pub(crate) const MAX_ACCEPT_POLL_MS: u64 = 10_000;
/// Maximum retained history entries.
pub(crate) const MAX_HISTORY_ENTRIES: usize = 100_000;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Phase Readiness configuration loaded from `phase-readiness.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhaseReadinessConfig {
    /// Decision engine policy.
    pub engine: EngineConfig,
    /// Observability dispatcher settings.
    pub server: ServerConfig,
    /// Snapshot history settings.
    pub history: HistoryConfig,
    /// Audit log settings.
    pub audit: AuditConfig,
}

impl PhaseReadinessConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| {
            ConfigError::Io(format!("{}: {err}", resolved.display()))
        })?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_engine(&self.engine)?;
        self.server.validate()?;
        self.history.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Engine Validation
// ============================================================================

/// Validates engine policy parameters.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] naming the first offending parameter.
pub fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    for (name, value) in engine.numeric_fields() {
        if !value.is_finite() {
            return Err(ConfigError::Invalid(format!("engine.{name} must be finite")));
        }
    }
    if engine.temp_min_c >= engine.temp_max_c {
        return Err(ConfigError::Invalid(
            "engine.temp_min_c must be less than engine.temp_max_c".to_string(),
        ));
    }
    if engine.max_abs_dtdt_c_per_s <= 0.0 {
        return Err(ConfigError::Invalid(
            "engine.max_abs_dtdt_c_per_s must be greater than zero".to_string(),
        ));
    }
    if engine.max_abs_temp_jump_c <= 0.0 {
        return Err(ConfigError::Invalid(
            "engine.max_abs_temp_jump_c must be greater than zero".to_string(),
        ));
    }
    if !(0.0 ..= 1.0).contains(&engine.ewma_alpha) {
        return Err(ConfigError::Invalid("engine.ewma_alpha must be within [0, 1]".to_string()));
    }
    if engine.persistence_s < 0.0 {
        return Err(ConfigError::Invalid("engine.persistence_s must be non-negative".to_string()));
    }
    for (name, value) in [
        ("hysteresis_block_threshold", engine.hysteresis_block_threshold),
        ("coherence_allow_threshold", engine.coherence_allow_threshold),
    ] {
        if !(0.0 ..= 1.0).contains(&value) {
            return Err(ConfigError::Invalid(format!("engine.{name} must be within [0, 1]")));
        }
    }
    if engine.max_dt_s <= 0.0 {
        return Err(ConfigError::Invalid("engine.max_dt_s must be greater than zero".to_string()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Server Config
// ============================================================================

/// Observability dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// IP address to bind.
    pub bind_address: String,
    /// TCP port to bind (0 selects an ephemeral port).
    pub port: u16,
    /// Listen backlog depth.
    pub listen_backlog: u32,
    /// Per-socket receive timeout in milliseconds.
    pub socket_timeout_ms: u64,
    /// Accept loop poll interval in milliseconds.
    pub accept_poll_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            listen_backlog: 10,
            socket_timeout_ms: 5_000,
            accept_poll_ms: 100,
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bind address is not an IP.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.bind_address.trim().parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "server.bind_address must be an IP address: {}",
                self.bind_address
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Returns the per-socket receive timeout.
    #[must_use]
    pub const fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_ms)
    }

    /// Returns the accept loop poll interval.
    #[must_use]
    pub const fn accept_poll(&self) -> Duration {
        Duration::from_millis(self.accept_poll_ms)
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if !(MIN_LISTEN_BACKLOG ..= MAX_LISTEN_BACKLOG).contains(&self.listen_backlog) {
            return Err(ConfigError::Invalid(format!(
                "server.listen_backlog must be within [{MIN_LISTEN_BACKLOG}, {MAX_LISTEN_BACKLOG}]"
            )));
        }
        if !(MIN_SOCKET_TIMEOUT_MS ..= MAX_SOCKET_TIMEOUT_MS).contains(&self.socket_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "server.socket_timeout_ms must be within [{MIN_SOCKET_TIMEOUT_MS}, \
                 {MAX_SOCKET_TIMEOUT_MS}]"
            )));
        }
        if !(MIN_ACCEPT_POLL_MS ..= MAX_ACCEPT_POLL_MS).contains(&self.accept_poll_ms) {
            return Err(ConfigError::Invalid(format!(
                "server.accept_poll_ms must be within [{MIN_ACCEPT_POLL_MS}, {MAX_ACCEPT_POLL_MS}]"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: History Config
// ============================================================================

/// Snapshot history settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Maximum retained history entries.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: phase_readiness_core::runtime::DEFAULT_MAX_HISTORY,
        }
    }
}

impl HistoryConfig {
    /// Validates history configuration.
    fn validate(self) -> Result<(), ConfigError> {
        if self.max_entries == 0 || self.max_entries > MAX_HISTORY_ENTRIES {
            return Err(ConfigError::Invalid(format!(
                "history.max_entries must be within [1, {MAX_HISTORY_ENTRIES}]"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit Config
// ============================================================================

/// Audit log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when absent.
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    if path.components().any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(ConfigError::Invalid("config path component too long".to_string()));
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if Path::new(trimmed)
        .components()
        .any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(ConfigError::Invalid(format!("{field} path component too long")));
    }
    Ok(())
}
