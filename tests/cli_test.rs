use httpmock::prelude::*;
use serde_json::json;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn zenodo_upload() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_zenodo-upload"));
    command.env_remove("ZENODO_ACCESS_TOKEN").env_remove("RUST_LOG");
    command
}

#[test]
fn test_invalid_token_exits_with_code_1() {
    let server = MockServer::start();
    let token = server.mock(|when, then| {
        when.method(GET).path("/api/deposit/depositions");
        then.status(403);
    });
    let create = server.mock(|when, then| {
        when.method(POST).path("/api/deposit/depositions");
        then.status(201);
    });

    let output = zenodo_upload()
        .args(["--path", "Cargo.toml", "--token", "bad-token", "--base-url"])
        .arg(server.url("/api"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Access token invalid"));
    token.assert();
    create.assert_hits(0);
}

#[test]
fn test_successful_upload_prints_deposition_id() {
    let mut source = NamedTempFile::new().unwrap();
    source.write_all(b"hello zenodo").unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/deposit/depositions")
            .query_param("access_token", "good-token");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/deposit/depositions");
        then.status(201)
            .json_body(json!({"id": 4242, "links": {"bucket": server.url("/api/files/b")}}));
    });
    let upload = server.mock(|when, then| {
        when.method(PUT).path_contains("/api/files/b/").body("hello zenodo");
        then.status(201).json_body(json!({"key": "upload", "size": 12}));
    });
    server.mock(|when, then| {
        when.method(PUT).path("/api/deposit/depositions/4242");
        then.status(200).json_body(json!({"id": 4242}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/deposit/depositions/4242/actions/publish");
        then.status(202)
            .json_body(json!({"id": 4242, "submitted": true, "doi": "10.5281/zenodo.4242"}));
    });

    let output = zenodo_upload()
        .arg("--path")
        .arg(source.path())
        .arg("--base-url")
        .arg(server.url("/api"))
        .env("ZENODO_ACCESS_TOKEN", "good-token")
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("No deposition ID detected. Creating new file publication."));
    assert!(stdout.contains("New upload deposition ID: 4242"));
    assert!(stdout.contains("DOI: 10.5281/zenodo.4242"));
    upload.assert();
}

#[test]
fn test_missing_token_is_a_configuration_error() {
    let output = zenodo_upload()
        .args(["--path", "Cargo.toml", "--base-url", "http://127.0.0.1:9/api"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("access_token"));
}

#[test]
fn test_dry_run_does_not_create_anything() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/deposit/depositions");
        then.status(200).json_body(json!([]));
    });
    let new_version = server.mock(|when, then| {
        when.method(POST).path_contains("/actions/");
        then.status(201);
    });

    let output = zenodo_upload()
        .args(["--depo_id", "31", "--token", "t", "--dry-run", "--base-url"])
        .arg(server.url("/api"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout)
        .contains("Would create a new version of deposition 31"));
    new_version.assert_hits(0);
}
