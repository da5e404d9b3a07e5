// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use hc::time::parse_time;
use hc::{Assignment, File, HcClient, Server, ServerConfig, Student, SubmitParams};
use std::path::Path;
use tempfile::TempDir;

pub const INFINITE_ASSIGNMENT: &str = "Test Assignment Infinite";
pub const LJF_ID: &str = "202326202022";
pub const LJF_NAME: &str = "刘家福";

/// Server config rooted in `dir`, bound to an ephemeral local port.
pub fn test_config(dir: &Path) -> ServerConfig {
    let mut config = ServerConfig::with_data_dir(dir.join("data"));
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.export_dir = dir.join("exports");
    config
}

/// Start a server in a fresh temp directory and connect a client to it.
///
/// Returns (TempDir, Server, HcClient) - keep the TempDir alive to prevent cleanup.
pub async fn start_server() -> (TempDir, Server, HcClient) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut server = Server::new(test_config(temp_dir.path())).unwrap();
    server.start().await.unwrap();
    let client = connect(&server);
    (temp_dir, server, client)
}

pub fn connect(server: &Server) -> HcClient {
    let addr = server.local_addr().unwrap();
    HcClient::new(format!("http://{}", addr)).unwrap()
}

/// An assignment open from 2025-11-26 until 2099-11-26.
pub fn infinite_assignment() -> Assignment {
    Assignment::new(
        INFINITE_ASSIGNMENT,
        parse_time("2025-11-26T00:00:00Z").unwrap(),
        parse_time("2099-11-26T00:00:00Z").unwrap(),
    )
}

/// An assignment that closed long ago.
pub fn closed_assignment() -> Assignment {
    Assignment::new(
        "Test Assignment Closed",
        parse_time("2020-01-01T00:00:00Z").unwrap(),
        parse_time("2020-02-01T00:00:00Z").unwrap(),
    )
}

pub fn ljf() -> Student {
    Student::new(LJF_ID, LJF_NAME)
}

pub fn ljf_submit(assignment_name: &str) -> SubmitParams {
    SubmitParams {
        student_id: LJF_ID.to_string(),
        student_name: LJF_NAME.to_string(),
        assignment_name: assignment_name.to_string(),
        file: File::from_bytes("ljf sb", b"SB LJF"),
    }
}

/// List (path, contents) of every regular file in a .tar.zst archive.
pub fn archive_files(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let decoder = zstd::Decoder::new(bytes).unwrap();
    let mut archive = tar::Archive::new(decoder);
    let mut files = Vec::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        if entry.header().entry_type() != tar::EntryType::Regular {
            continue;
        }
        let path = entry.path().unwrap().to_string_lossy().to_string();
        let mut contents = Vec::new();
        std::io::Read::read_to_end(&mut entry, &mut contents).unwrap();
        files.push((path, contents));
    }
    files
}
