// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! One-shot HTTP listener standing in for a device's update endpoint.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A request as received by the fake device.
pub struct CapturedRequest {
    /// Request line and headers, lowercased.
    pub head: String,
    /// Body with any chunked framing removed.
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.head
            .lines()
            .find_map(|l| l.strip_prefix(prefix.as_str()))
            .map(str::trim)
    }

    /// Body as lossy lowercase text, for locating part headers.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_ascii_lowercase()
    }
}

pub struct FakeDevice {
    pub url: String,
    handle: JoinHandle<CapturedRequest>,
}

impl FakeDevice {
    /// Accept a single request, answer with `status` and `body`.
    pub fn start(status: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/update", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream
                .set_read_timeout(Some(Duration::from_secs(10)))
                .unwrap();

            let captured = read_request(&mut stream);

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            captured
        });

        Self { url, handle }
    }

    pub fn request(self) -> CapturedRequest {
        self.handle.join().unwrap()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn read_request(stream: &mut impl Read) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).unwrap();
        assert!(n > 0, "connection closed before headers");
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
    let mut raw_body = buf[head_end + 4..].to_vec();

    let content_length = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .map(|v| v.trim().parse::<usize>().unwrap());

    match content_length {
        Some(len) => {
            while raw_body.len() < len {
                let n = stream.read(&mut chunk).unwrap();
                assert!(n > 0, "connection closed mid-body");
                raw_body.extend_from_slice(&chunk[..n]);
            }
            CapturedRequest {
                head,
                body: raw_body,
            }
        }
        None => {
            while !raw_body.ends_with(b"0\r\n\r\n") {
                let n = stream.read(&mut chunk).unwrap();
                assert!(n > 0, "connection closed mid-body");
                raw_body.extend_from_slice(&chunk[..n]);
            }
            CapturedRequest {
                head,
                body: dechunk(&raw_body),
            }
        }
    }
}

fn dechunk(mut raw: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    loop {
        let line_end = find(raw, b"\r\n").unwrap();
        let size_str = String::from_utf8_lossy(&raw[..line_end]);
        let size = usize::from_str_radix(size_str.split(';').next().unwrap().trim(), 16).unwrap();
        raw = &raw[line_end + 2..];
        if size == 0 {
            return body;
        }
        body.extend_from_slice(&raw[..size]);
        raw = &raw[size + 2..];
    }
}

/// Run the built binary with a clean environment for its own variables.
pub fn run_cli(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ota-upload"))
        .args(args)
        .current_dir(cwd)
        .env_remove("OTA_UPLOAD_URL")
        .env_remove("OTA_USERNAME")
        .env_remove("OTA_PASSWORD")
        .env_remove("PIOENV")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}
