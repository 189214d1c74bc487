// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz
//
// Loading snapshots over HTTP: status and connection failures surface as
// load errors, and a complete server yields the same dataset as a directory.

use flightmap_core::{Dataset, LoadError, SnapshotNames, SnapshotSource};
use serde_json::json;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

// --- Mock Helpers ---

/// Serves `files` by request path on an ephemeral port; anything else is a 404.
fn serve(files: HashMap<String, String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            respond(stream, &files);
        }
    });
    format!("http://{}/data", addr)
}

fn respond(stream: TcpStream, files: &HashMap<String, String>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header == "\r\n" => break,
            Ok(_) => {}
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("");
    let response = match files.get(path) {
        Some(body) => format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ),
        None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
    };
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn snapshot_files() -> HashMap<String, String> {
    let entries = [
        (
            "flights_points.json",
            json!([{"iata": "VIE", "lat": 48.110298, "lon": 16.5697, "w": 2}]),
        ),
        (
            "airports.json",
            json!({"VIE": {"iata": "VIE", "country": "AT", "lat": 48.110298, "lon": 16.5697}}),
        ),
        (
            "flights.json",
            json!({"flights": [{"date": "2024-01-01", "from": "VIE", "to": "FRA"}]}),
        ),
        (
            "flights_routes.json",
            json!([{"a": "VIE", "b": "FRA", "a_lat": 48.110298, "a_lon": 16.5697, "b_lat": 50.033333, "b_lon": 8.570556, "w": 1}]),
        ),
    ];
    entries
        .into_iter()
        .map(|(name, value)| (format!("/data/{}", name), value.to_string()))
        .collect()
}

// --- Test Suite ---

#[test]
fn test_http_load_full_dataset() {
    let base = serve(snapshot_files());
    let source = SnapshotSource::http(&format!("{}/", base)).unwrap();

    let dataset = Dataset::load(&source, &SnapshotNames::default()).unwrap();
    assert_eq!(dataset.points.len(), 1);
    assert_eq!(dataset.airports.len(), 1);
    assert_eq!(dataset.flights().len(), 1);
    assert_eq!(dataset.routes.len(), 1);
}

#[test]
fn test_http_not_found_is_a_status_error() {
    let base = serve(HashMap::new());
    let source = SnapshotSource::http(&base).unwrap();

    match source.fetch_json("flights.json") {
        Err(LoadError::Status { url, status }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/data/flights.json"), "url was {}", url);
        }
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[test]
fn test_http_missing_snapshot_fails_whole_load() {
    let mut files = snapshot_files();
    files.remove("/data/flights.json");
    let base = serve(files);
    let source = SnapshotSource::http(&base).unwrap();

    match Dataset::load(&source, &SnapshotNames::default()) {
        Err(LoadError::Status { url, status: 404 }) => assert!(url.ends_with("flights.json")),
        other => panic!("expected a 404 for flights.json, got {:?}", other),
    }
}

#[test]
fn test_http_connection_refused_is_a_fetch_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let source = SnapshotSource::http(&format!("http://127.0.0.1:{}", port)).unwrap();

    match Dataset::load(&source, &SnapshotNames::default()) {
        Err(LoadError::Http { url, .. }) => assert!(url.ends_with("flights_points.json")),
        other => panic!("expected a fetch error, got {:?}", other),
    }
}
