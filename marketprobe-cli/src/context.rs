//! Wiring from settings and flags to a ready client.

use marketprobe_core::Diagnostics;
use marketprobe_fetch::{IdentityPool, ProxyPool, RequestClient};
use marketprobe_store::{FileIdentitySource, FileProxySource, Settings, SettingsStore};
use tracing::debug;

use crate::Cli;

/// Loads settings from `--config` or the default path.
pub fn load_settings(cli: &Cli) -> SettingsStore {
    match &cli.config {
        Some(path) => SettingsStore::load(path.clone()),
        None => SettingsStore::load_default(),
    }
}

/// Builds a request client from settings, with flags taking precedence.
pub fn build_client(cli: &Cli, settings: &Settings) -> RequestClient {
    let mut builder = settings.client_config();
    if let Some(host) = &cli.host {
        builder = builder.host_url(host);
    }
    let config = builder.session_token(cli.token.clone()).build();

    let identities = load_identities(settings, config.diagnostics("identity-pool"));
    let proxies = ProxyPool::load(
        &FileProxySource::new(settings.proxies_path(), config.diagnostics("proxy-source")),
        config.diagnostics("proxy-pool"),
    );
    debug!(
        identities = identities.len(),
        proxies = proxies.len(),
        "Credential pools loaded"
    );

    RequestClient::builder(config)
        .identity_pool(identities)
        .proxy_pool(proxies)
        .build()
}

/// Loads the identity file, falling back to the built-in list if allowed.
fn load_identities(settings: &Settings, diag: Diagnostics) -> IdentityPool {
    let source = FileIdentitySource::new(settings.identities_path(), diag.scoped("identity-source"));
    let pool = IdentityPool::load(&source, diag);
    if pool.is_empty() && settings.builtin_identities {
        debug!("Using built-in identities");
        return IdentityPool::builtin(diag);
    }
    pool
}
