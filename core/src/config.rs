//! Deployment configuration.

use crate::calendar::WeekStart;

pub const API_URL_VAR: &str = "PET_SCHEDULER_API_URL";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

/// Chosen at deployment; not changeable from a running session.
pub const DEFAULT_WEEK_START: WeekStart = WeekStart::Sunday;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub week_start: WeekStart,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            week_start: DEFAULT_WEEK_START,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self {
            api_url,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_url_uses_default() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.api_url, "http://127.0.0.1:5000/api");
        assert_eq!(config.week_start, WeekStart::Sunday);
    }

    #[test]
    fn blank_url_uses_default() {
        let config = Config::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn url_is_read_from_lookup() {
        let config = Config::from_lookup(|key| {
            (key == API_URL_VAR).then(|| "https://pets.example.com/api".to_string())
        });
        assert_eq!(config.api_url, "https://pets.example.com/api");
    }
}
