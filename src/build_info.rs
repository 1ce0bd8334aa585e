//! Build metadata
//!
//! Counter and compile time come from `build.rs`; both are absent when the
//! crate is built without it (e.g. by tooling), which reads as build 0.

use serde::Serialize;
use tracing::info;

const RAW_BUILD_NUMBER: Option<&str> = option_env!("NURTURE_BUILD_NUMBER");
const RAW_BUILD_TIMESTAMP: Option<&str> = option_env!("NURTURE_BUILD_TIMESTAMP");

/// What is running, as reported by `/health` and the startup banner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            build_number: parse_build_number(RAW_BUILD_NUMBER),
            build_timestamp: RAW_BUILD_TIMESTAMP.unwrap_or("unknown"),
        }
    }
}

fn parse_build_number(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

pub fn log_startup_banner() {
    let build = BuildInfo::current();
    info!(
        version = build.version,
        build = build.build_number,
        compiled = build.build_timestamp,
        "Nurture child nutrition backend starting"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_number() {
        assert_eq!(parse_build_number(Some("42")), 42);
        assert_eq!(parse_build_number(Some("")), 0);
        assert_eq!(parse_build_number(Some("4a")), 0);
        assert_eq!(parse_build_number(None), 0);
    }

    #[test]
    fn test_current_uses_package_metadata() {
        let build = BuildInfo::current();
        assert_eq!(build.name, "nurture");
        assert_eq!(build.version, env!("CARGO_PKG_VERSION"));
    }
}
