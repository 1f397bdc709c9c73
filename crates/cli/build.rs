// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::env::var("OUT_DIR")?;
    let path = std::path::Path::new(&out_dir).join("env_vars.rs");
    let mut f = std::fs::File::create(path)?;

    let vars = [
        ("LEARNMATE_DATA_DIR", "LEARNMATE_DATA_DIR"),
        ("LEARNMATE_API_URL", "LEARNMATE_API_URL"),
        ("LEARNMATE_TOKEN", "LEARNMATE_TOKEN"),
        ("LEARNMATE_OFFLINE", "LEARNMATE_OFFLINE"),
        ("XDG_DATA_HOME", "XDG_DATA_HOME"),
    ];

    for (const_name, env_name) in &vars {
        writeln!(f, "pub const {const_name}: &str = \"{env_name}\";")?;
    }

    Ok(())
}
