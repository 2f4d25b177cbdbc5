// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `MarketProbe` Store
//!
//! Settings and credential files for the `MarketProbe` workspace.
//!
//! This crate provides:
//!
//! - **Settings**: JSON user preferences, turned into a client configuration
//! - **Sources**: File-backed identity and proxy lists
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use marketprobe_store::{FileIdentitySource, SettingsStore};
//! use marketprobe_core::Diagnostics;
//!
//! let store = SettingsStore::load_default();
//! let config = store.get().client_config().build();
//! let identities = FileIdentitySource::new(store.get().identities_path(), Diagnostics::enabled("identities"));
//! ```

pub mod error;
pub mod persistence;
pub mod settings;
pub mod sources;

pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_identities_path, default_proxies_path, default_settings_path,
    ensure_dir, load_json, load_json_or_default, save_json,
};
pub use settings::{LogLevel, Settings, SettingsStore};
pub use sources::{FileIdentitySource, FileProxySource};
