//! Tests for ReqwestTransport against a loopback server
//!
//! The server thread accepts one connection, captures the request and
//! answers with a canned status and body.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use roadmapgen::application::{ApplicationError, RoadmapService};
use roadmapgen::config::Settings;
use roadmapgen::infrastructure::traits::{HttpTransport, ReqwestTransport};
use roadmapgen::util::testing;

#[derive(Debug)]
struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Serve exactly one request, then hand back what was received.
fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let captured = read_request(&stream);
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        (&stream).write_all(response.as_bytes()).expect("write response");
        captured
    });

    (base_url, handle)
}

fn read_request(stream: &TcpStream) -> CapturedRequest {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).unwrap();

    CapturedRequest {
        request_line: request_line.trim_end().to_string(),
        headers,
        body: String::from_utf8(body).unwrap(),
    }
}

/// Loopback traffic must not be routed through a proxy from the environment.
fn transport() -> ReqwestTransport {
    testing::init_test_setup();
    let client = reqwest::blocking::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("client");
    ReqwestTransport::from_client(client)
}

#[test]
fn given_json_body_when_posting_then_sends_post_with_content_type() {
    let (base_url, server) = serve_once("200 OK", r#"{"response":"ok"}"#.to_string());

    let response = transport()
        .post_json(&format!("{base_url}/api/generate"), r#"{"model":"m"}"#.to_string())
        .expect("post");

    let request = server.join().unwrap();
    assert_eq!(request.request_line, "POST /api/generate HTTP/1.1");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.body, r#"{"model":"m"}"#);
    assert_eq!(response.status, 200);
    assert_eq!(response.body, r#"{"response":"ok"}"#);
}

#[test]
fn given_server_error_when_posting_then_returns_status_and_body() {
    let (base_url, server) =
        serve_once("500 Internal Server Error", "server overloaded".to_string());

    let response = transport()
        .post_json(&format!("{base_url}/api/generate"), "{}".to_string())
        .expect("error statuses are not transport failures");
    server.join().unwrap();

    assert_eq!(response.status, 500);
    assert_eq!(response.body, "server overloaded");
    assert!(response.is_error());
}

#[test]
fn given_timeout_when_building_client_then_succeeds() {
    assert!(ReqwestTransport::new(Some(Duration::from_secs(5))).is_ok());
    assert!(ReqwestTransport::new(None).is_ok());
}

#[test]
fn given_closed_port_when_posting_then_transport_error() {
    // Bind then drop to get a port nothing listens on
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{port}/api/generate");

    match transport().post_json(&url, "{}".to_string()) {
        Err(ApplicationError::Transport { endpoint, .. }) => assert_eq!(endpoint, url),
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[test]
fn given_real_transport_when_server_overloaded_then_service_returns_remote_error() {
    let (base_url, server) =
        serve_once("500 Internal Server Error", "server overloaded".to_string());
    let settings = Arc::new(Settings {
        base_url,
        ..Settings::default()
    });
    let service = RoadmapService::new(settings, Arc::new(transport()));

    let err = service.generate_json("Learn Rust").unwrap_err();
    let request = server.join().unwrap();

    assert!(request.body.contains("\"stream\":false"));
    match err {
        ApplicationError::Remote { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "server overloaded");
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[test]
fn given_real_transport_when_server_answers_then_service_parses_roadmap() {
    let envelope = serde_json::json!({
        "model": "llama3.2:latest",
        "response": r#"{"title":"X","children":[{"title":"Y","link":null}]}"#,
        "done": true
    })
    .to_string();
    let (base_url, server) = serve_once("200 OK", envelope);
    let settings = Arc::new(Settings {
        base_url,
        ..Settings::default()
    });
    let service = RoadmapService::new(settings, Arc::new(transport()));

    let root = service.generate_roadmap("Learn X").expect("roadmap");
    server.join().unwrap();

    assert_eq!(root.title.as_deref(), Some("X"));
    assert_eq!(root.children[0].title.as_deref(), Some("Y"));
    assert_eq!(root.children[0].link, None);
}
