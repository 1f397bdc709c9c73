// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `LEARNMATE_DATA_DIR` if set.
pub fn data_dir() -> Option<PathBuf> {
    non_empty(vars::LEARNMATE_DATA_DIR).map(PathBuf::from)
}

/// Returns the value of `LEARNMATE_API_URL` if set.
pub fn api_url() -> Option<String> {
    non_empty(vars::LEARNMATE_API_URL)
}

/// Returns the value of `LEARNMATE_TOKEN` if set.
pub fn token() -> Option<String> {
    non_empty(vars::LEARNMATE_TOKEN)
}

/// Returns `true` if `LEARNMATE_OFFLINE` is `1` or `true`.
pub fn force_offline() -> bool {
    std::env::var(vars::LEARNMATE_OFFLINE)
        .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Returns the value of `XDG_DATA_HOME` if set.
pub fn xdg_data_home() -> Option<PathBuf> {
    non_empty(vars::XDG_DATA_HOME).map(PathBuf::from)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
