//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

/// (key, default, secret, required, description)
type DefTuple = (&'static str, &'static str, bool, bool, &'static str);

const DEFS: &[DefTuple] = &[
    ("SERVER_PORT", "8080", false, true, "HTTP/WebSocket listen port"),
    (
        "WORKER_ORIGIN",
        "http://localhost:8080",
        false,
        true,
        "Origin the worker serves; only windows on it are reused on click",
    ),
    (
        "CACHE_NAME",
        worker_core::CACHE_NAME,
        false,
        true,
        "Current cache namespace; others are deleted on activation",
    ),
    (
        "DEFAULT_NOTIFICATION_URL",
        worker_core::DEFAULT_NOTIFICATION_URL,
        false,
        false,
        "Page opened when a notification carries no url",
    ),
    (
        "NOTIFICATION_ICON",
        worker_core::DEFAULT_ICON,
        false,
        false,
        "Icon and badge path for every notification",
    ),
    (
        "PERSIST_SCHEDULES",
        "true",
        false,
        false,
        "Keep scheduled notifications across restarts",
    ),
    (
        "SCHEDULED_DISMISS_ACTION",
        "false",
        false,
        false,
        "Offer a dismiss button on scheduled notifications",
    ),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub secret: bool,
    pub required: bool,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, secret, required, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    secret,
                    required,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
