//! SettingsManager: DB-backed settings with defaults, env migration and feature status.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use recitation_db::Database;

use super::app_config::ENV_ONLY_KEYS;
use super::defaults::DEFAULT_SETTINGS;
use super::validation::validate_setting;
use super::{FeatureStatus, SettingInfo, SettingType};

/// Wraps [`Database`] to provide high-level settings operations.
pub struct SettingsManager {
    db: Database,
}

impl SettingsManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a setting value. Falls back to default if not in DB.
    pub fn get_setting(&self, key: &str) -> Result<String, anyhow::Error> {
        if let Some(val) = self.db.get_setting(key)? {
            return Ok(val);
        }
        if let Some(def) = DEFAULT_SETTINGS.get(key) {
            return Ok(def.default.to_string());
        }
        anyhow::bail!("setting not found: {key}");
    }

    /// Get a setting parsed as `T`, with the same default fallback.
    pub fn get_typed<T>(&self, key: &str) -> Result<T, anyhow::Error>
    where
        T: FromStr,
        T::Err: Display,
    {
        if let Some(val) = self.db.get_setting_as::<T>(key)? {
            return Ok(val);
        }
        let def = DEFAULT_SETTINGS
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("setting not found: {key}"))?;
        def.default
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("default for {key} does not parse: {e}"))
    }

    /// Set a setting value with validation.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        let def = writable_def(key)?;

        validate_setting(key, value)
            .map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))?;

        self.db.set_setting(key, value, def.secret)?;
        Ok(())
    }

    /// Validate every entry first, then write them in one transaction.
    pub fn set_settings(&self, updates: &HashMap<String, String>) -> Result<(), anyhow::Error> {
        for (key, value) in updates {
            writable_def(key)?;
            validate_setting(key, value)
                .map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))?;
        }
        self.db.set_settings(updates)?;
        Ok(())
    }

    /// Get all settings, filling in defaults for missing keys.
    pub fn get_all_settings(&self) -> Result<HashMap<String, SettingInfo>, anyhow::Error> {
        let mut result = HashMap::new();

        for row in self.db.list_settings()? {
            let def = DEFAULT_SETTINGS.get(row.key.as_str());
            result.insert(
                row.key.clone(),
                SettingInfo {
                    has_value: !row.value.is_empty(),
                    setting_type: setting_type(row.secret),
                    required: def.is_some_and(|d| d.required),
                    description: def.map_or(String::new(), |d| d.description.to_string()),
                    key: row.key,
                    value: row.value,
                },
            );
        }

        for (key, def) in DEFAULT_SETTINGS.iter() {
            if result.contains_key(*key) {
                continue;
            }
            result.insert(
                key.to_string(),
                SettingInfo {
                    key: key.to_string(),
                    value: def.default.to_string(),
                    setting_type: setting_type(def.secret),
                    required: def.required,
                    description: def.description.to_string(),
                    has_value: !def.default.is_empty(),
                },
            );
        }

        Ok(result)
    }

    /// Initialize default settings in DB (skip existing).
    pub fn initialize_defaults(&self) -> Result<(), anyhow::Error> {
        for (key, def) in DEFAULT_SETTINGS.iter() {
            self.db.insert_setting_if_absent(key, def.default, def.secret)?;
        }
        Ok(())
    }

    /// Copy settings from environment variables into the DB (one-time).
    /// Invalid values are skipped with a warning.
    pub fn migrate_from_env(&self) -> Result<u32, anyhow::Error> {
        let mut migrated = 0u32;
        for (key, def) in DEFAULT_SETTINGS.iter() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            let Ok(env_val) = std::env::var(key) else {
                continue;
            };
            if env_val.is_empty() {
                continue;
            }
            if let Err(e) = validate_setting(key, &env_val) {
                tracing::warn!("Ignoring invalid {key} from env: {e}");
                continue;
            }
            if self.db.insert_setting_if_absent(key, &env_val, def.secret)? {
                tracing::info!("Migrated setting from env: {key}");
                migrated += 1;
            }
        }
        if migrated > 0 {
            tracing::info!("Migration completed: {migrated} settings migrated");
        }
        Ok(migrated)
    }

    /// Check which optional features are configured. The window opener is
    /// environment-only, so the caller reports whether it is set.
    pub fn check_feature_status(
        &self,
        window_opener_configured: bool,
    ) -> Result<FeatureStatus, anyhow::Error> {
        let mut status = FeatureStatus {
            window_opener_configured,
            durable_schedules: self.get_setting("PERSIST_SCHEDULES")? == "true",
            missing_settings: Vec::new(),
            warnings: Vec::new(),
        };

        if !window_opener_configured {
            status.missing_settings.push("WINDOW_OPEN_COMMAND".into());
            status
                .warnings
                .push("Notification clicks with no open page cannot open a window".into());
        }

        if !status.durable_schedules {
            status
                .warnings
                .push("PERSIST_SCHEDULES is disabled - scheduled notifications are lost on restart".into());
        }

        Ok(status)
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}

fn writable_def(key: &str) -> Result<&'static super::defaults::SettingDef, anyhow::Error> {
    if ENV_ONLY_KEYS.contains(&key) {
        anyhow::bail!("{key} can only be set in the server environment");
    }
    DEFAULT_SETTINGS
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("unknown setting key: {key}"))
}

fn setting_type(secret: bool) -> SettingType {
    if secret {
        SettingType::Secret
    } else {
        SettingType::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SettingsManager {
        SettingsManager::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn get_falls_back_to_default() {
        let sm = manager();
        assert_eq!(sm.get_setting("SERVER_PORT").unwrap(), "8080");
        assert!(sm.get_setting("NOPE").is_err());
    }

    #[test]
    fn typed_reads_use_stored_value_or_default() {
        let sm = manager();
        assert_eq!(sm.get_typed::<u16>("SERVER_PORT").unwrap(), 8080);
        assert!(sm.get_typed::<bool>("PERSIST_SCHEDULES").unwrap());

        sm.set_setting("SERVER_PORT", "9000").unwrap();
        sm.set_setting("PERSIST_SCHEDULES", "false").unwrap();
        assert_eq!(sm.get_typed::<u16>("SERVER_PORT").unwrap(), 9000);
        assert!(!sm.get_typed::<bool>("PERSIST_SCHEDULES").unwrap());

        sm.db().set_setting("SERVER_PORT", "not-a-port", false).unwrap();
        assert!(sm.get_typed::<u16>("SERVER_PORT").is_err());
        assert!(sm.get_typed::<u16>("NOPE").is_err());
    }

    #[test]
    fn set_validates_and_persists() {
        let sm = manager();
        sm.set_setting("CACHE_NAME", "sacred-recitations-v2").unwrap();
        assert_eq!(sm.get_setting("CACHE_NAME").unwrap(), "sacred-recitations-v2");

        assert!(sm.set_setting("PERSIST_SCHEDULES", "maybe").is_err());
        assert!(sm.set_setting("UNKNOWN_KEY", "x").is_err());
    }

    #[test]
    fn bulk_update_is_all_or_nothing() {
        let sm = manager();
        let mut updates = HashMap::new();
        updates.insert("SERVER_PORT".to_string(), "9000".to_string());
        updates.insert("PERSIST_SCHEDULES".to_string(), "sometimes".to_string());
        assert!(sm.set_settings(&updates).is_err());
        assert_eq!(sm.get_setting("SERVER_PORT").unwrap(), "8080");

        updates.insert("PERSIST_SCHEDULES".to_string(), "false".to_string());
        sm.set_settings(&updates).unwrap();
        assert_eq!(sm.get_setting("SERVER_PORT").unwrap(), "9000");
        assert_eq!(sm.get_setting("PERSIST_SCHEDULES").unwrap(), "false");
    }

    #[test]
    fn initialize_defaults_keeps_existing_values() {
        let sm = manager();
        sm.set_setting("SCHEDULED_DISMISS_ACTION", "true").unwrap();
        sm.initialize_defaults().unwrap();

        let all = sm.get_all_settings().unwrap();
        assert_eq!(all["SCHEDULED_DISMISS_ACTION"].value, "true");
        assert_eq!(all["WORKER_ORIGIN"].value, "http://localhost:8080");
        assert!(!all.contains_key("WINDOW_OPEN_COMMAND"));
        assert_eq!(all.len(), DEFAULT_SETTINGS.len());
    }

    #[test]
    fn feature_status_reports_missing_opener() {
        let sm = manager();
        let status = sm.check_feature_status(false).unwrap();
        assert!(!status.window_opener_configured);
        assert!(status.durable_schedules);
        assert_eq!(status.missing_settings, vec!["WINDOW_OPEN_COMMAND".to_string()]);

        sm.set_setting("PERSIST_SCHEDULES", "false").unwrap();
        let status = sm.check_feature_status(true).unwrap();
        assert!(status.window_opener_configured);
        assert!(!status.durable_schedules);
        assert_eq!(status.warnings.len(), 1);
    }

    #[test]
    fn env_only_keys_are_not_writable() {
        let sm = manager();
        let err = sm.set_setting("WINDOW_OPEN_COMMAND", "xdg-open").unwrap_err();
        assert!(err.to_string().contains("server environment"));

        let mut updates = HashMap::new();
        updates.insert("CACHE_NAME".to_string(), "sacred-recitations-v2".to_string());
        updates.insert("SERVER_BIND_ADDRESS".to_string(), "0.0.0.0".to_string());
        assert!(sm.set_settings(&updates).is_err());
        assert_eq!(sm.get_setting("CACHE_NAME").unwrap(), "sacred-recitations-v1");
        assert!(sm.db().get_setting("SERVER_BIND_ADDRESS").unwrap().is_none());
    }
}
