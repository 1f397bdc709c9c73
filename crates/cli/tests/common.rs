// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens on port 1, so health checks fail immediately.
pub const UNREACHABLE_API: &str = "http://127.0.0.1:1/api";

pub fn learnmate_bin() -> Command {
    cargo_bin_cmd!("learnmate")
}

/// `learnmate` with an isolated environment and data directory.
///
/// The server is unreachable; pass `--offline` to skip the health check.
pub fn learnmate(temp: &TempDir) -> Command {
    let mut cmd = learnmate_bin();
    cmd.arg("--data-dir")
        .arg(temp.path())
        .env_remove("LEARNMATE_DATA_DIR")
        .env_remove("LEARNMATE_TOKEN")
        .env_remove("LEARNMATE_OFFLINE")
        .env_remove("RUST_LOG")
        .env_remove("http_proxy")
        .env_remove("HTTP_PROXY")
        .env_remove("all_proxy")
        .env_remove("ALL_PROXY")
        .env("LEARNMATE_API_URL", UNREACHABLE_API);
    cmd
}

/// `learnmate --offline` with an isolated environment and data directory.
pub fn offline(temp: &TempDir) -> Command {
    let mut cmd = learnmate(temp);
    cmd.arg("--offline");
    cmd
}

/// Queue a lesson progress update while offline.
pub fn queue_progress(temp: &TempDir, lesson_id: i64, seconds: u64) {
    offline(temp)
        .args(["progress", &lesson_id.to_string(), "-t", &seconds.to_string()])
        .assert()
        .success();
}

/// Serve canned API responses on a random local port, keyed by path below
/// `/api`. Unknown paths answer 404. Returns the API root URL.
pub fn serve_api(routes: &[(&str, &str)]) -> String {
    let routes: HashMap<String, String> = routes
        .iter()
        .map(|(path, body)| (format!("/api{path}"), body.to_string()))
        .collect();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let api_url = format!("http://{}/api", listener.local_addr().unwrap());

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else {
                continue;
            };
            let path = read_request_path(&stream);
            let (status, body) = match routes.get(&path) {
                Some(body) => ("200 OK", body.as_str()),
                None => ("404 Not Found", r#"{"success":false,"message":"Route not found"}"#),
            };
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    api_url
}

/// Read one request and return its path without the query string.
fn read_request_path(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    let _ = reader.read_line(&mut request_line);

    let mut length = 0;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).unwrap_or(0) == 0 || header == "\r\n" {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; length];
    let _ = reader.read_exact(&mut body);

    let target = request_line.split_whitespace().nth(1).unwrap_or("");
    target.split('?').next().unwrap_or("").to_string()
}
