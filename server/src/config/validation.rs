//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_CACHE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,127}$").unwrap());
static RE_ABSOLUTE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/[^\s]*$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_PORT" => validate_int_range(value, 1, 65535)?,
        "WORKER_ORIGIN" => {
            let url = url::Url::parse(value).map_err(|e| format!("invalid URL: {e}"))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err("must be an http or https origin".into());
            }
            if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
                return Err("must be an origin without path, query or fragment".into());
            }
        }
        "CACHE_NAME" => {
            if !RE_CACHE_NAME.is_match(value) {
                return Err("must be 1-128 characters of letters, digits, '.', '_' or '-'".into());
            }
        }
        "DEFAULT_NOTIFICATION_URL" | "NOTIFICATION_ICON" => {
            if !RE_ABSOLUTE_PATH.is_match(value) {
                return Err("must be an absolute path starting with '/'".into());
            }
        }
        k if is_boolean_setting(k) => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i32, max: i32) -> Result<(), String> {
    let v: i32 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn is_boolean_setting(key: &str) -> bool {
    matches!(key, "PERSIST_SCHEDULES" | "SCHEDULED_DISMISS_ACTION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_boolean() {
        assert!(validate_setting("PERSIST_SCHEDULES", "true").is_ok());
        assert!(validate_setting("SCHEDULED_DISMISS_ACTION", "false").is_ok());
        assert!(validate_setting("PERSIST_SCHEDULES", "yes").is_err());
    }

    #[test]
    fn test_valid_port() {
        assert!(validate_setting("SERVER_PORT", "8080").is_ok());
        assert!(validate_setting("SERVER_PORT", "0").is_err());
        assert!(validate_setting("SERVER_PORT", "70000").is_err());
        assert!(validate_setting("SERVER_PORT", "http").is_err());
    }

    #[test]
    fn test_valid_origin() {
        assert!(validate_setting("WORKER_ORIGIN", "http://localhost:8080").is_ok());
        assert!(validate_setting("WORKER_ORIGIN", "https://recitations.example").is_ok());
        assert!(validate_setting("WORKER_ORIGIN", "https://recitations.example/app").is_err());
        assert!(validate_setting("WORKER_ORIGIN", "ftp://recitations.example").is_err());
        assert!(validate_setting("WORKER_ORIGIN", "localhost").is_err());
    }

    #[test]
    fn test_valid_cache_name() {
        assert!(validate_setting("CACHE_NAME", "sacred-recitations-v2").is_ok());
        assert!(validate_setting("CACHE_NAME", "").is_err());
        assert!(validate_setting("CACHE_NAME", "has space").is_err());
    }

    #[test]
    fn test_valid_paths() {
        assert!(validate_setting("DEFAULT_NOTIFICATION_URL", "/calendar").is_ok());
        assert!(validate_setting("NOTIFICATION_ICON", "/main.png").is_ok());
        assert!(validate_setting("DEFAULT_NOTIFICATION_URL", "calendar").is_err());
        assert!(validate_setting("DEFAULT_NOTIFICATION_URL", "").is_err());
    }
}
