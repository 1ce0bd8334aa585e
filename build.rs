//! Build script for Nurture
//!
//! Embeds a build counter and the compile time, reported by the startup
//! banner and `/health`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const COUNTER_FILE: &str = "build_number.txt";

fn next_build_number(counter: &Path) -> u64 {
    let previous = fs::read_to_string(counter)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    previous + 1
}

fn main() {
    println!("cargo:rerun-if-changed=src");

    let root = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_default();
    let counter = root.join(COUNTER_FILE);

    let build = next_build_number(&counter);
    if let Err(e) = fs::write(&counter, build.to_string()) {
        println!("cargo:warning=Could not persist build number: {}", e);
    }

    let compiled_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    println!("cargo:rustc-env=NURTURE_BUILD_NUMBER={}", build);
    println!("cargo:rustc-env=NURTURE_BUILD_TIMESTAMP={}", compiled_at);
}
