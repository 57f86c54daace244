use std::env;

use thiserror::Error;

use crate::domain::pricing::UnresolvedProductPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read from the process environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
    pub unresolved_products: UnresolvedProductPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080u16)?;
        let pool_size = parse_or(&lookup, "DATABASE_POOL_SIZE", 10u32)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_POOL_SIZE",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let unresolved_products = parse_or(
            &lookup,
            "UNRESOLVED_PRODUCT_POLICY",
            UnresolvedProductPolicy::default(),
        )?;

        Ok(Self {
            database_url,
            host,
            port,
            pool_size,
            unresolved_products,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/shop")]).unwrap();

        assert_eq!(cfg.database_url, "postgres://localhost/shop");
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.pool_size, 10);
        assert_eq!(cfg.unresolved_products, UnresolvedProductPolicy::Skip);
    }

    #[test]
    fn every_setting_can_be_overridden() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://db/shop"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("DATABASE_POOL_SIZE", "4"),
            ("UNRESOLVED_PRODUCT_POLICY", "reject"),
        ])
        .unwrap();

        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.pool_size, 4);
        assert_eq!(cfg.unresolved_products, UnresolvedProductPolicy::Reject);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = config(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn bad_port_names_the_variable() {
        let err = config(&[("DATABASE_URL", "x"), ("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().starts_with("PORT has an invalid value 'eighty'"));
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = config(&[("DATABASE_URL", "x"), ("DATABASE_POOL_SIZE", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "DATABASE_POOL_SIZE",
                ..
            }
        ));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = config(&[("DATABASE_URL", "x"), ("UNRESOLVED_PRODUCT_POLICY", "maybe")])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "UNRESOLVED_PRODUCT_POLICY",
                ..
            }
        ));
    }
}
