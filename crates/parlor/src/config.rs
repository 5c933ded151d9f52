//! Runtime configuration, read from the environment.
//!
//! Four knobs: `PARLOR_HOST`, `PARLOR_PORT`, `PARLOR_TTL_SECS`, and
//! `PARLOR_ENV`. The environment mode drives the TTL default and how much
//! detail unexpected errors expose to clients. The bundled store is
//! in-process, so there is no store address to configure; a networked
//! `SessionStore` backend would bring its own.

use std::time::Duration;

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvMode {
    #[default]
    Development,
    Production,
}

impl EnvMode {
    fn parse(value: &str) -> Self {
        match value {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Idle-session TTL when none is configured: short in development so
    /// abandoned test sessions disappear quickly, two hours in production
    /// so a dinner-break lobby survives.
    pub fn default_ttl(self) -> Duration {
        match self {
            Self::Development => Duration::from_secs(10 * 60),
            Self::Production => Duration::from_secs(2 * 60 * 60),
        }
    }
}

/// Everything `parlord` needs to start.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ttl: Duration,
    pub env: EnvMode,
}

impl Config {
    /// Reads config from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The lookup is injected so tests can feed variables without
    /// touching the process environment.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let env = get("PARLOR_ENV")
            .map(|v| EnvMode::parse(&v))
            .unwrap_or_default();

        let host = get("PARLOR_HOST").unwrap_or_else(|| "127.0.0.1".into());

        let port = match get("PARLOR_PORT").map(|v| v.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(_)) => {
                tracing::warn!("PARLOR_PORT is not a port number, using 4000");
                4000
            }
            None => 4000,
        };

        let ttl = match get("PARLOR_TTL_SECS").map(|v| v.parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => Duration::from_secs(secs),
            Some(_) => {
                tracing::warn!(
                    "PARLOR_TTL_SECS must be a positive number, using default"
                );
                env.default_ttl()
            }
            None => env.default_ttl(),
        };

        Self {
            host,
            port,
            ttl,
            env,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        let env = EnvMode::default();
        Self {
            host: "127.0.0.1".into(),
            port: 4000,
            ttl: env.default_ttl(),
            env,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<_, _> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_from_lookup_empty_env_gives_dev_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.env, EnvMode::Development);
        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
        assert_eq!(config.ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_from_lookup_production_lengthens_ttl_default() {
        let config = config_from(&[("PARLOR_ENV", "production")]);

        assert!(config.env.is_production());
        assert_eq!(config.ttl, Duration::from_secs(7200));
    }

    #[test]
    fn test_from_lookup_explicit_ttl_overrides_env_default() {
        let config = config_from(&[
            ("PARLOR_ENV", "production"),
            ("PARLOR_TTL_SECS", "30"),
        ]);

        assert_eq!(config.ttl, Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_bad_port_falls_back() {
        let config = config_from(&[("PARLOR_PORT", "not-a-port")]);
        assert_eq!(config.port, 4000);
    }

    #[test]
    fn test_from_lookup_zero_ttl_falls_back() {
        let config = config_from(&[("PARLOR_TTL_SECS", "0")]);
        assert_eq!(config.ttl, EnvMode::Development.default_ttl());
    }

    #[test]
    fn test_env_mode_parse_unknown_is_development() {
        assert_eq!(EnvMode::parse("staging"), EnvMode::Development);
        assert_eq!(EnvMode::parse("prod"), EnvMode::Production);
    }
}
