//! Runtime application configuration loaded from DB + environment overrides.

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use url::Url;
use worker_core::WorkerConfig;

use super::manager::SettingsManager;

/// Runtime configuration populated from the settings DB.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub worker_origin: Url,
    pub cache_name: String,
    pub default_notification_url: String,
    pub notification_icon: String,
    pub persist_schedules: bool,
    pub scheduled_dismiss_action: bool,
    /// Listen address. Environment only (`SERVER_BIND_ADDRESS`).
    pub bind_address: IpAddr,
    /// Window opener program. Environment only (`WINDOW_OPEN_COMMAND`).
    pub window_open_command: String,
}

/// Keys read from the process environment and never from the settings table.
pub const ENV_ONLY_KEYS: &[&str] = &["SERVER_BIND_ADDRESS", "WINDOW_OPEN_COMMAND"];

impl AppConfig {
    /// Load configuration from the settings manager (DB-first, env overrides).
    pub fn load(sm: &SettingsManager) -> Result<Self, anyhow::Error> {
        Self::load_with_env(sm, &|key: &str| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with an explicit environment lookup.
    pub fn load_with_env(
        sm: &SettingsManager,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> String { sm.get_setting(key).unwrap_or_default() };
        let mut server_port = typed_or(sm, "SERVER_PORT", 8080u16);
        if let Some(p) = env("SERVER_PORT").and_then(|v| v.parse::<u16>().ok()) {
            server_port = p;
        }

        let worker_origin = Url::parse(&g("WORKER_ORIGIN"))
            .map_err(|e| anyhow::anyhow!("invalid WORKER_ORIGIN: {e}"))?;

        let bind_address = match env("SERVER_BIND_ADDRESS") {
            Some(v) if !v.trim().is_empty() => v.trim().parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid SERVER_BIND_ADDRESS {v:?}: {e}");
                IpAddr::V4(Ipv4Addr::LOCALHOST)
            }),
            _ => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        Ok(Self {
            server_port,
            worker_origin,
            cache_name: or_default(g("CACHE_NAME"), worker_core::CACHE_NAME),
            default_notification_url: or_default(
                g("DEFAULT_NOTIFICATION_URL"),
                worker_core::DEFAULT_NOTIFICATION_URL,
            ),
            notification_icon: or_default(g("NOTIFICATION_ICON"), worker_core::DEFAULT_ICON),
            persist_schedules: typed_or(sm, "PERSIST_SCHEDULES", true),
            scheduled_dismiss_action: typed_or(sm, "SCHEDULED_DISMISS_ACTION", false),
            bind_address,
            window_open_command: env("WINDOW_OPEN_COMMAND")
                .map(|c| c.trim().to_string())
                .unwrap_or_default(),
        })
    }

    /// Reload config from the settings manager.
    pub fn reload(&mut self, sm: &SettingsManager) -> Result<(), anyhow::Error> {
        *self = Self::load(sm)?;
        Ok(())
    }

    pub fn window_opener_configured(&self) -> bool {
        !self.window_open_command.is_empty()
    }

    /// The worker's view of this configuration.
    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig::for_origin(self.worker_origin.clone())
            .with_cache_name(&self.cache_name)
            .with_default_url(&self.default_notification_url)
            .with_icon(&self.notification_icon)
            .with_scheduled_dismiss_action(self.scheduled_dismiss_action)
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() { default.to_string() } else { value }
}

/// Typed setting, or `default` with a warning when the stored value is unusable.
fn typed_or<T>(sm: &SettingsManager, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    sm.get_typed(key).unwrap_or_else(|e| {
        tracing::warn!("Using default for {key}: {e}");
        default
    })
}
