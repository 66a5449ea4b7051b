use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::db::DbAccess;

pub const DEFAULT_MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in .env")]
    Missing(&'static str),
    #[error("{name} is not in the correct format: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum VideoStoreConfig {
    Local { dir: PathBuf, public_url: String },
    Remote { base_url: String, api_key: String, bucket: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: Ipv4Addr,
    pub port: u16,
    pub db_access: DbAccess,
    pub video_store: VideoStoreConfig,
    pub max_video_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let invalid = |name: &'static str, value: &str| ConfigError::Invalid {
            name,
            value: value.to_string(),
        };

        let database_url = required("DATABASE_URL")?;

        let host_raw = required("HOST")?;
        let host: Ipv4Addr = host_raw.parse().map_err(|_| invalid("HOST", &host_raw))?;

        let port_raw = required("PORT")?;
        let port: u16 = port_raw.parse().map_err(|_| invalid("PORT", &port_raw))?;

        let db_access = match lookup("DB_ACCESS") {
            Some(raw) => raw.parse().map_err(|_| invalid("DB_ACCESS", &raw))?,
            None => DbAccess::default(),
        };

        let video_store = match lookup("VIDEO_STORE").as_deref().unwrap_or("local") {
            "local" => VideoStoreConfig::Local {
                dir: PathBuf::from(lookup("VIDEO_DIR").unwrap_or_else(|| "./videos".to_string())),
                public_url: lookup("VIDEO_PUBLIC_URL").unwrap_or_else(|| "/videos".to_string()),
            },
            "remote" => VideoStoreConfig::Remote {
                base_url: required("STORAGE_URL")?,
                api_key: required("STORAGE_KEY")?,
                bucket: lookup("STORAGE_BUCKET").unwrap_or_else(|| "videos".to_string()),
            },
            other => return Err(invalid("VIDEO_STORE", other)),
        };

        let max_video_bytes = match lookup("MAX_VIDEO_BYTES") {
            Some(raw) => raw.parse().map_err(|_| invalid("MAX_VIDEO_BYTES", &raw))?,
            None => DEFAULT_MAX_VIDEO_BYTES,
        };

        Ok(Config {
            database_url,
            host,
            port,
            db_access,
            video_store,
            max_video_bytes,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |name: &str| map.get(name).map(|v| v.to_string())
    }

    const BASE: [(&str, &str); 3] = [
        ("DATABASE_URL", "sqlite://liftboard.db"),
        ("HOST", "127.0.0.1"),
        ("PORT", "8080"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&BASE)).unwrap();
        assert_eq!(config.addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.db_access, DbAccess::Elevated);
        assert_eq!(config.max_video_bytes, DEFAULT_MAX_VIDEO_BYTES);
        assert_eq!(
            config.video_store,
            VideoStoreConfig::Local {
                dir: PathBuf::from("./videos"),
                public_url: "/videos".to_string()
            }
        );
    }

    #[test]
    fn test_missing_and_invalid() {
        let err = Config::from_lookup(lookup(&BASE[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("PORT")));

        let err = Config::from_lookup(lookup(&[BASE[0], BASE[1], ("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn test_remote_store_requires_credentials() {
        let mut pairs = BASE.to_vec();
        pairs.push(("VIDEO_STORE", "remote"));
        pairs.push(("STORAGE_URL", "https://proj.example.co"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Missing("STORAGE_KEY")
        ));

        pairs.push(("STORAGE_KEY", "secret"));
        pairs.push(("DB_ACCESS", "restricted"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.db_access, DbAccess::Restricted);
        assert!(matches!(config.video_store, VideoStoreConfig::Remote { ref bucket, .. } if bucket == "videos"));
    }
}
