//! User settings.
//!
//! Settings are a JSON file. Every field has a default, so a partial or
//! empty file is valid and a missing file means "all defaults".

use std::path::{Path, PathBuf};
use std::time::Duration;

use marketprobe_fetch::cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use marketprobe_fetch::config::{DEFAULT_BOOTSTRAP_ATTEMPTS, DEFAULT_MAX_RETRIES};
use marketprobe_fetch::guards::{DEFAULT_COOKIE_PREFIX, DEFAULT_HOST_URL, DEFAULT_MAX_PAYLOAD_KB};
use marketprobe_fetch::host::http::DEFAULT_TIMEOUT_SECS;
use marketprobe_fetch::{BackoffPolicy, ClientConfig, ClientConfigBuilder, RecoveryTable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{
    default_identities_path, default_proxies_path, default_settings_path, load_json, save_json,
};

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Marketplace host URL.
    pub host_url: String,

    /// Session cookie prefix in `name=` form.
    pub cookie_prefix: String,

    /// Maximum serialized parameter payload in kilobytes.
    pub max_payload_kb: u32,

    /// Attempts per API request.
    pub max_retries: u32,

    /// Attempts per session bootstrap.
    pub bootstrap_attempts: u32,

    /// Per-attempt timeout in seconds.
    pub timeout_secs: u64,

    /// Delay between attempts.
    pub backoff: BackoffPolicy,

    /// Status code rules applied on top of the standard recovery table.
    pub recovery_overrides: RecoveryTable,

    /// Number of cached responses (0 disables the cache).
    pub cache_capacity: usize,

    /// Lifetime of a cached response in seconds.
    pub cache_ttl_secs: u64,

    /// Upper bound on the host URL length.
    pub max_host_len: Option<usize>,

    /// Identity list file; defaults to `identities.json` next to the settings.
    pub identities_path: Option<PathBuf>,

    /// Proxy list file; defaults to `proxies.json` next to the settings.
    pub proxies_path: Option<PathBuf>,

    /// Fall back to built-in browser identities when no identity file loads.
    pub builtin_identities: bool,

    /// Emit component diagnostics.
    pub diagnostics: bool,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host_url: DEFAULT_HOST_URL.to_string(),
            cookie_prefix: DEFAULT_COOKIE_PREFIX.to_string(),
            max_payload_kb: DEFAULT_MAX_PAYLOAD_KB,
            max_retries: DEFAULT_MAX_RETRIES,
            bootstrap_attempts: DEFAULT_BOOTSTRAP_ATTEMPTS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            backoff: BackoffPolicy::default(),
            recovery_overrides: RecoveryTable::empty(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            max_host_len: None,
            identities_path: None,
            proxies_path: None,
            builtin_identities: true,
            diagnostics: true,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Identity list file to load.
    pub fn identities_path(&self) -> PathBuf {
        self.identities_path
            .clone()
            .unwrap_or_else(default_identities_path)
    }

    /// Proxy list file to load.
    pub fn proxies_path(&self) -> PathBuf {
        self.proxies_path.clone().unwrap_or_else(default_proxies_path)
    }

    /// Client configuration builder seeded from these settings.
    pub fn client_config(&self) -> ClientConfigBuilder {
        ClientConfig::builder()
            .host_url(&self.host_url)
            .cookie_prefix(&self.cookie_prefix)
            .max_payload_kb(self.max_payload_kb)
            .max_retries(self.max_retries)
            .bootstrap_attempts(self.bootstrap_attempts)
            .timeout(Duration::from_secs(self.timeout_secs))
            .backoff(self.backoff.clone())
            .recovery(RecoveryTable::standard().merged(&self.recovery_overrides))
            .cache(self.cache_capacity, Duration::from_secs(self.cache_ttl_secs))
            .max_host_len(self.max_host_len)
            .logging(self.diagnostics)
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings bound to the file they were loaded from.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Settings,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store with default settings.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Settings::default(),
            path,
        }
    }

    /// Loads settings from the default path.
    pub fn load_default() -> Self {
        Self::load(default_settings_path())
    }

    /// Loads settings from a path.
    ///
    /// A missing or unreadable file yields defaults.
    pub fn load(path: PathBuf) -> Self {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        Self { settings, path }
    }

    /// Current settings.
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the settings file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Updates settings in memory.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.settings);
    }

    /// Sets one field by name.
    ///
    /// `value` is parsed as JSON; anything that is not valid JSON is taken
    /// as a plain string.
    ///
    /// # Errors
    ///
    /// Returns error for unknown keys or values of the wrong type.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut object = match serde_json::to_value(&self.settings)? {
            Value::Object(object) => object,
            _ => return Err(StoreError::Config("Settings are not an object".to_string())),
        };

        if !object.contains_key(key) {
            return Err(StoreError::Config(format!("Unknown setting: {key}")));
        }

        let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        object.insert(key.to_string(), parsed);

        self.settings = serde_json::from_value(Value::Object(object))
            .map_err(|e| StoreError::Config(format!("Invalid value for {key}: {e}")))?;
        Ok(())
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub fn save(&self) -> Result<(), StoreError> {
        save_json(&self.path, &self.settings)?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
