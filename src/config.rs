//! Runtime configuration
//!
//! Read from `NURTURE_*` environment variables; anything unset or unparsable
//! falls back to its default.

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{info, warn};

pub const DATABASE_PATH_VAR: &str = "NURTURE_DATABASE_PATH";
pub const HOST_VAR: &str = "NURTURE_HOST";
pub const PORT_VAR: &str = "NURTURE_PORT";
pub const POOL_SIZE_VAR: &str = "NURTURE_POOL_SIZE";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            database_path: lookup(DATABASE_PATH_VAR)
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            host: try_load(&lookup, HOST_VAR, DEFAULT_HOST.to_string()),
            port: try_load(&lookup, PORT_VAR, DEFAULT_PORT),
            pool_size: try_load(&lookup, POOL_SIZE_VAR, DEFAULT_POOL_SIZE).max(1),
        }
    }

    /// Socket address to bind
    pub fn bind_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}

/// `<project>/data/nurture.db`, where the project root is two levels above
/// `target/{debug,release}` when running from a cargo build
fn default_database_path() -> PathBuf {
    let mut path = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(root) = path.parent().and_then(|target| target.parent()) {
            path = root.to_path_buf();
        }
    }

    path.push("data");
    path.push("nurture.db");
    path
}
