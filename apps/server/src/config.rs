//! # Server Configuration
//!
//! ## Configuration Sources (Priority Order, later wins)
//! 1. Defaults (this file)
//! 2. Config file `till.toml` (path from `TILL_CONFIG`, else the platform
//!    config directory)
//! 3. Environment variables (`TILL_*`)
//!
//! Configuration is read-only after startup.
//!
//! ## Example `till.toml`
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/till/till.db"
//!
//! [billing]
//! default_tax_rate_percent = 5.0
//! store_name = "Chai Point"
//!
//! [reporting]
//! utc_offset_minutes = 330   # IST
//!
//! [printing]
//! spool_dir = "/var/spool/till"
//! paper_width = 42
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use till_core::document::text::MIN_PAPER_WIDTH;
use till_core::{CurrencyFormat, DocumentStyle, TaxRate};

/// Largest accepted reference offset, in minutes (±18h).
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Could not read config file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Could not parse config file: {0}")]
    Parse(String),
}

impl ConfigError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Full server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub database: DatabaseConfig,
    pub store: StoreConfig,
    pub billing: BillingConfig,
    pub reporting: ReportingConfig,
    pub printing: PrintingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl HttpConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: default_database_path(),
            max_connections: 5,
        }
    }
}

/// Bill store call limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound for a single store call; elapsed means "unavailable".
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig { timeout_ms: 5_000 }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Tax applied at checkout when the cashier doesn't enter one.
    pub default_tax_rate_percent: f64,
    /// Printed at the top of invoices and reports.
    pub store_name: String,
    pub currency_symbol: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        BillingConfig {
            default_tax_rate_percent: 0.0,
            store_name: "Till POS".to_string(),
            currency_symbol: "₹".to_string(),
        }
    }
}

/// Reference zone for report day boundaries and printed timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Offset east of UTC, in minutes. 330 = IST, -300 = EST.
    pub utc_offset_minutes: i32,
}

impl ReportingConfig {
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        if self.utc_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES.unsigned_abs() {
            return Err(ConfigError::invalid(
                "reporting.utc_offset_minutes",
                format!("must be within ±{MAX_OFFSET_MINUTES}"),
            ));
        }
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::invalid("reporting.utc_offset_minutes", "not a valid UTC offset")
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintingConfig {
    /// Directory that receives printed documents as text files.
    pub spool_dir: PathBuf,
    /// Characters per line (receipt printers: 32, 42 or 48).
    pub paper_width: usize,
}

impl Default for PrintingConfig {
    fn default() -> Self {
        PrintingConfig {
            spool_dir: PathBuf::from("spool"),
            paper_width: 48,
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

impl ServerConfig {
    /// Loads defaults, then `till.toml`, then `TILL_*` variables, and
    /// validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match config_file_path()? {
            Some(path) => {
                info!(path = %path.display(), "Loading config file");
                Self::from_file(&path)?
            }
            None => {
                debug!("No config file, using defaults");
                ServerConfig::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies `TILL_*` overrides read through `var`.
    ///
    /// ## Environment Variables
    /// | Variable | Field |
    /// |---|---|
    /// | `TILL_BIND_ADDR` | `server.bind_addr` |
    /// | `TILL_PORT` | `server.port` |
    /// | `TILL_DB_PATH` | `database.path` |
    /// | `TILL_DB_MAX_CONNECTIONS` | `database.max_connections` |
    /// | `TILL_STORE_TIMEOUT_MS` | `store.timeout_ms` |
    /// | `TILL_TAX_RATE` | `billing.default_tax_rate_percent` |
    /// | `TILL_STORE_NAME` | `billing.store_name` |
    /// | `TILL_CURRENCY_SYMBOL` | `billing.currency_symbol` |
    /// | `TILL_UTC_OFFSET_MINUTES` | `reporting.utc_offset_minutes` |
    /// | `TILL_SPOOL_DIR` | `printing.spool_dir` |
    /// | `TILL_PAPER_WIDTH` | `printing.paper_width` |
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("TILL_BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Some(v) = var("TILL_PORT") {
            self.server.port = parse_var("TILL_PORT", &v)?;
        }
        if let Some(v) = var("TILL_DB_PATH") {
            self.database.path = PathBuf::from(v);
        }
        if let Some(v) = var("TILL_DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("TILL_DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = var("TILL_STORE_TIMEOUT_MS") {
            self.store.timeout_ms = parse_var("TILL_STORE_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = var("TILL_TAX_RATE") {
            self.billing.default_tax_rate_percent = parse_var("TILL_TAX_RATE", &v)?;
        }
        if let Some(v) = var("TILL_STORE_NAME") {
            self.billing.store_name = v;
        }
        if let Some(v) = var("TILL_CURRENCY_SYMBOL") {
            self.billing.currency_symbol = v;
        }
        if let Some(v) = var("TILL_UTC_OFFSET_MINUTES") {
            self.reporting.utc_offset_minutes = parse_var("TILL_UTC_OFFSET_MINUTES", &v)?;
        }
        if let Some(v) = var("TILL_SPOOL_DIR") {
            self.printing.spool_dir = PathBuf::from(v);
        }
        if let Some(v) = var("TILL_PAPER_WIDTH") {
            self.printing.paper_width = parse_var("TILL_PAPER_WIDTH", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("database.path", "must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid(
                "database.max_connections",
                "must be at least 1",
            ));
        }
        if self.store.timeout_ms == 0 {
            return Err(ConfigError::invalid("store.timeout_ms", "must be positive"));
        }
        TaxRate::try_from_percentage(self.billing.default_tax_rate_percent)
            .map_err(|e| ConfigError::invalid("billing.default_tax_rate_percent", e.to_string()))?;
        if self.billing.store_name.trim().is_empty() {
            return Err(ConfigError::invalid("billing.store_name", "must not be empty"));
        }
        self.reporting.offset()?;
        if self.printing.spool_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("printing.spool_dir", "must not be empty"));
        }
        if self.printing.paper_width < MIN_PAPER_WIDTH {
            return Err(ConfigError::invalid(
                "printing.paper_width",
                format!("must be at least {MIN_PAPER_WIDTH}"),
            ));
        }
        Ok(())
    }

    pub fn default_tax_rate(&self) -> Result<TaxRate, ConfigError> {
        TaxRate::try_from_percentage(self.billing.default_tax_rate_percent)
            .map_err(|e| ConfigError::invalid("billing.default_tax_rate_percent", e.to_string()))
    }

    /// Document style for printed invoices and reports.
    pub fn document_style(&self) -> Result<DocumentStyle, ConfigError> {
        Ok(DocumentStyle {
            store_name: self.billing.store_name.clone(),
            currency: CurrencyFormat::new(self.billing.currency_symbol.clone()),
            offset: self.reporting.offset()?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, format!("cannot parse {raw:?}")))
}

/// `TILL_CONFIG` if set (must exist), else `till.toml` in the platform
/// config directory if present.
fn config_file_path() -> Result<Option<PathBuf>, ConfigError> {
    if let Ok(explicit) = std::env::var("TILL_CONFIG") {
        let path = PathBuf::from(explicit);
        if !path.is_file() {
            return Err(ConfigError::Unreadable {
                path: path.display().to_string(),
                reason: "file does not exist".to_string(),
            });
        }
        return Ok(Some(path));
    }

    Ok(ProjectDirs::from("com", "till", "pos")
        .map(|dirs| dirs.config_dir().join("till.toml"))
        .filter(|path| path.is_file()))
}

/// Platform data directory, falling back to the working directory.
///
/// - **macOS**: `~/Library/Application Support/com.till.pos/till.db`
/// - **Windows**: `%APPDATA%\till\pos\data\till.db`
/// - **Linux**: `~/.local/share/pos/till.db`
fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "till", "pos")
        .map(|dirs| dirs.data_dir().join("till.db"))
        .unwrap_or_else(|| PathBuf::from("till.db"))
}
