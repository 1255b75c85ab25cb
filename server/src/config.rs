use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use chrono::Duration;
use identity::DEFAULT_SESSION_TTL_SECS;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    PartialTls,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Longest accepted session lifetime (30 days)
pub const MAX_SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub session_ttl: Duration,
    pub preferences_path: PathBuf,
    pub tls: Option<TlsPaths>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let tls = match (lookup("TLS_CERT_PATH"), lookup("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialTls),
        };

        Ok(Self {
            bind_addr: try_load(&lookup, "BIND_ADDR", "0.0.0.0")?,
            port: try_load(&lookup, "PORT", "8080")?,
            session_ttl: session_ttl(try_load(
                &lookup,
                "SESSION_TTL_SECS",
                &DEFAULT_SESSION_TTL_SECS.to_string(),
            )?)?,
            preferences_path: try_load(&lookup, "PREFERENCES_PATH", "preferences.json")?,
            tls,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn session_ttl(secs: i64) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| {
        warn!("Invalid SESSION_TTL_SECS value: {reason}");
        ConfigError::Invalid {
            key: "SESSION_TTL_SECS",
            value: secs.to_string(),
            reason,
        }
    };

    if !(1..=MAX_SESSION_TTL_SECS).contains(&secs) {
        return Err(invalid(format!("must be between 1 and {MAX_SESSION_TTL_SECS} seconds")));
    }
    Duration::try_seconds(secs).ok_or_else(|| invalid("out of range".to_string()))
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:8080");
        assert_eq!(config.session_ttl, Duration::seconds(3600));
        assert_eq!(config.preferences_path, PathBuf::from("preferences.json"));
        assert!(config.tls.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("BIND_ADDR", "127.0.0.1"),
            ("SESSION_TTL_SECS", "60"),
            ("TLS_CERT_PATH", "/certs/cert.pem"),
            ("TLS_KEY_PATH", "/certs/key.pem"),
        ])
        .unwrap();
        assert_eq!(config.address(), "127.0.0.1:9000");
        assert_eq!(config.session_ttl, Duration::seconds(60));
        assert_eq!(
            config.tls,
            Some(TlsPaths {
                cert: "/certs/cert.pem".into(),
                key: "/certs/key.pem".into(),
            })
        );
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
    }

    #[test]
    fn test_session_ttl_must_be_positive() {
        for value in ["0", "-60"] {
            assert!(matches!(
                config(&[("SESSION_TTL_SECS", value)]),
                Err(ConfigError::Invalid { key: "SESSION_TTL_SECS", .. })
            ));
        }
    }

    #[test]
    fn test_session_ttl_upper_bound() {
        let max = MAX_SESSION_TTL_SECS.to_string();
        assert_eq!(
            config(&[("SESSION_TTL_SECS", max.as_str())]).unwrap().session_ttl,
            Duration::seconds(MAX_SESSION_TTL_SECS)
        );

        for value in ["9000000000000", "9223372036854775807"] {
            assert!(matches!(
                config(&[("SESSION_TTL_SECS", value)]),
                Err(ConfigError::Invalid { key: "SESSION_TTL_SECS", .. })
            ));
        }
    }

    #[test]
    fn test_tls_needs_both_paths() {
        assert!(matches!(
            config(&[("TLS_CERT_PATH", "/certs/cert.pem")]),
            Err(ConfigError::PartialTls)
        ));
    }
}
