//! Session configuration: a method-chained builder over the recognized
//! configuration keys for both live and replay sessions.

use crate::error::{Error, Result};
use crate::replay::ReplayConfig;
use crate::types::enums::Provider;

/// Recognized configuration for a [`crate::Client`] session.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) provider: Provider,
    /// Client-wide trades-only default, OR'd with the per-call flag.
    pub(crate) trades_only: bool,
    /// Request the server-side delayed feed even when realtime is entitled.
    pub(crate) delayed: bool,
    /// Browser-compatible auth (`Authorization: Public` header); suppresses
    /// signal handler registration regardless of `handle_shutdown_signal`.
    pub(crate) is_public_key: bool,
    /// Opt-in: register a `Ctrl-C` handler that calls `stop()`. Off by
    /// default — a library should not install a process-wide signal
    /// handler unless the caller asks for it.
    pub(crate) handle_shutdown_signal: bool,
    /// When set, `Client::new` runs replay mode against `date` instead of
    /// opening a live session.
    pub(crate) replay: Option<ReplayConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::Realtime,
            trades_only: false,
            delayed: false,
            is_public_key: false,
            handle_shutdown_signal: false,
            replay: None,
        }
    }
}

impl Config {
    /// Start building a [`Config`] from defaults.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Provider::Manual { host } = &self.provider {
            if host.trim().is_empty() {
                return Err(Error::Config(
                    "Provider::Manual requires a non-empty ip_address/host".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Selects the auth/WS hosts and field interpretations. Default
    /// [`Provider::Realtime`].
    pub fn provider(mut self, provider: Provider) -> Self {
        self.config.provider = provider;
        self
    }

    /// Client-wide trades-only default. Default `false`.
    pub fn trades_only(mut self, trades_only: bool) -> Self {
        self.config.trades_only = trades_only;
        self
    }

    /// Request the delayed feed even when realtime is entitled. Default
    /// `false`.
    pub fn delayed(mut self, delayed: bool) -> Self {
        self.config.delayed = delayed;
        self
    }

    /// Use `Authorization: Public` header auth instead of `?api_key=`.
    /// Default `false`.
    pub fn is_public_key(mut self, is_public_key: bool) -> Self {
        self.config.is_public_key = is_public_key;
        self
    }

    /// Register a `Ctrl-C` handler that calls `stop()`. Ignored when
    /// `is_public_key` is set. Default `false`.
    pub fn handle_shutdown_signal(mut self, enable: bool) -> Self {
        self.config.handle_shutdown_signal = enable;
        self
    }

    /// Run replay mode for `replay_date` instead of opening a live session.
    pub fn replay(mut self, replay_config: ReplayConfig) -> Self {
        self.config.replay = Some(replay_config);
        self
    }

    /// Finish building, validating provider/host combinations.
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_realtime_provider() {
        let cfg = Config::default();
        assert!(matches!(cfg.provider, Provider::Realtime));
        assert!(!cfg.trades_only);
    }

    #[test]
    fn manual_provider_requires_host() {
        let err = Config::builder()
            .provider(Provider::Manual { host: String::new() })
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn manual_provider_with_host_is_valid() {
        let cfg = Config::builder()
            .provider(Provider::Manual { host: "localhost:8080".into() })
            .build()
            .unwrap();
        assert!(matches!(cfg.provider, Provider::Manual { .. }));
    }
}
