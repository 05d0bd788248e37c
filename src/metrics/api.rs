//! HTTP API for metric scrapes
//!
//! Serves the Prometheus text format and a JSON view of the counters.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use tracing::{debug, error, info, warn};

use super::counters::LevelCounterStore;
use super::exporter::PrometheusEndpoint;

const JSON: &str = "application/json";
const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4";

/// Upper bound on the request line plus headers
const MAX_REQUEST_HEAD: usize = 8192;

/// Start the metrics API server
///
/// This runs a simple HTTP server that responds to:
/// - GET /metrics - Prometheus scrape
/// - GET /stats - Per-level counts as JSON
pub fn start_api_server(
    addr: SocketAddr,
    endpoint: Arc<PrometheusEndpoint>,
    store: Arc<LevelCounterStore>,
) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind(addr)?;
    let local_addr = listener.local_addr()?;

    thread::spawn(move || serve(listener, endpoint, store));
    info!(addr = %local_addr, "Metrics API server started");

    Ok(local_addr)
}

/// Accept connections on `listener` until it fails, one thread per request
pub fn serve(listener: TcpListener, endpoint: Arc<PrometheusEndpoint>, store: Arc<LevelCounterStore>) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let endpoint = endpoint.clone();
                let store = store.clone();
                thread::spawn(move || {
                    if let Err(e) = handle_request(stream, &endpoint, &store) {
                        debug!(error = %e, "Request handling error");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "Failed to accept connection");
            }
        }
    }
    error!("Metrics API server stopped");
}

fn handle_request(
    mut stream: TcpStream,
    endpoint: &PrometheusEndpoint,
    store: &LevelCounterStore,
) -> std::io::Result<()> {
    let head = match read_request_head(&mut stream)? {
        Some(head) => head,
        None => return Ok(()),
    };

    let request = String::from_utf8_lossy(&head);
    let first_line = request.lines().next().unwrap_or("");
    let mut parts = first_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");

    let (status, content_type, body) = match (method, path) {
        ("GET", "/metrics") => ("200 OK", PROMETHEUS_TEXT, endpoint.render()),
        ("GET", "/stats") => (
            "200 OK",
            JSON,
            serde_json::to_string_pretty(&store.counts()).unwrap_or_default(),
        ),
        ("GET", "/") => {
            let help = r#"{
  "endpoints": {
    "/metrics": "Prometheus scrape",
    "/stats": "Log event counts by level"
  }
}"#;
            ("200 OK", JSON, help.to_string())
        }
        ("GET", _) => ("404 Not Found", JSON, r#"{"error": "Not found"}"#.to_string()),
        _ => (
            "405 Method Not Allowed",
            JSON,
            r#"{"error": "Method not allowed"}"#.to_string(),
        ),
    };

    let response = format!(
        "HTTP/1.1 {}\r\n\
         Content-Type: {}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        status,
        content_type,
        body.len(),
        body
    );

    stream.write_all(response.as_bytes())?;
    stream.flush()?;

    Ok(())
}

/// Read until the blank line ending the headers, the peer closes, or the
/// head grows past `MAX_REQUEST_HEAD`. `None` if nothing was received.
fn read_request_head(stream: &mut TcpStream) -> std::io::Result<Option<Vec<u8>>> {
    let mut head = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..n]);

        if head.windows(4).any(|w| w == b"\r\n\r\n") || head.len() >= MAX_REQUEST_HEAD {
            break;
        }
    }

    Ok((!head.is_empty()).then_some(head))
}
