use std::env;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: BackendConfig,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves the configuration through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let url = required(&lookup, "HABITS_BACKEND_URL")?;
        let anon_key = required(&lookup, "HABITS_BACKEND_ANON_KEY")?;

        let secure_cookies = match lookup("HABITS_SECURE_COOKIES") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                name: "HABITS_SECURE_COOKIES",
                value,
            })?,
            None => false,
        };

        Ok(Self {
            port,
            backend: BackendConfig { url, anon_key },
            secure_cookies,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String, ConfigError> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_values_are_absent() {
        let config = Config::from_lookup(lookup(&[
            ("HABITS_BACKEND_URL", "https://example.test"),
            ("HABITS_BACKEND_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.secure_cookies);
        assert_eq!(config.backend.url, "https://example.test");
    }

    #[test]
    fn missing_backend_url_is_reported() {
        let err = Config::from_lookup(lookup(&[("HABITS_BACKEND_ANON_KEY", "anon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("HABITS_BACKEND_URL")));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("PORT", "eighty"),
            ("HABITS_BACKEND_URL", "https://example.test"),
            ("HABITS_BACKEND_ANON_KEY", "anon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn secure_cookie_flag_parses_common_spellings() {
        let config = Config::from_lookup(lookup(&[
            ("HABITS_BACKEND_URL", "https://example.test"),
            ("HABITS_BACKEND_ANON_KEY", "anon"),
            ("HABITS_SECURE_COOKIES", "Yes"),
        ]))
        .unwrap();
        assert!(config.secure_cookies);
    }
}
