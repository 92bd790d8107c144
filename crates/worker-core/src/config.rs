//! Worker configuration.

use url::Url;

use crate::{CACHE_NAME, DEFAULT_ICON, DEFAULT_NOTIFICATION_URL, WorkerResult};

/// Values the worker reads while handling events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Origin the worker is installed for. Only windows on this origin are
    /// reused when a notification is clicked.
    pub origin: Url,
    pub cache_name: String,
    pub default_url: String,
    pub icon: String,
    pub badge: String,
    /// Add a `dismiss` action to scheduled notifications as well as push ones.
    pub scheduled_dismiss_action: bool,
}

impl WorkerConfig {
    pub fn new(origin: &str) -> WorkerResult<Self> {
        Ok(Self::for_origin(Url::parse(origin)?))
    }

    pub fn for_origin(origin: Url) -> Self {
        Self {
            origin,
            cache_name: CACHE_NAME.into(),
            default_url: DEFAULT_NOTIFICATION_URL.into(),
            icon: DEFAULT_ICON.into(),
            badge: DEFAULT_ICON.into(),
            scheduled_dismiss_action: false,
        }
    }

    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = name.into();
        self
    }

    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = url.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        let icon = icon.into();
        self.badge = icon.clone();
        self.icon = icon;
        self
    }

    pub fn with_scheduled_dismiss_action(mut self, enabled: bool) -> Self {
        self.scheduled_dismiss_action = enabled;
        self
    }

    /// Whether `url` belongs to the worker's origin.
    pub fn same_origin(&self, url: &str) -> bool {
        Url::parse(url)
            .map(|parsed| parsed.origin() == self.origin.origin())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = WorkerConfig::new("https://recitations.example").unwrap();
        assert_eq!(config.cache_name, "sacred-recitations-v1");
        assert_eq!(config.default_url, "/calendar");
        assert_eq!(config.icon, "/main.png");
        assert_eq!(config.badge, "/main.png");
        assert!(!config.scheduled_dismiss_action);
    }

    #[test]
    fn same_origin_compares_scheme_host_and_port() {
        let config = WorkerConfig::new("https://recitations.example").unwrap();
        assert!(config.same_origin("https://recitations.example/piece/1"));
        assert!(config.same_origin("https://recitations.example:443/"));
        assert!(!config.same_origin("http://recitations.example/"));
        assert!(!config.same_origin("https://recitations.example:8443/"));
        assert!(!config.same_origin("https://other.example/"));
        assert!(!config.same_origin("/relative/path"));
    }

    #[test]
    fn rejects_unparsable_origin() {
        assert!(WorkerConfig::new("not a url").is_err());
    }
}
