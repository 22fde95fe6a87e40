//! Mock registrar server for testing
//!
//! A tiny HTTP/1.1 server on a random local port. Routes map a request
//! path to a canned response; unknown paths get a 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Canned registrar response
#[derive(Debug, Clone)]
pub enum MockResponse {
    Status { code: u16, body: String },
    /// Advertises a longer body than it sends, then closes the connection
    Truncated,
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Status {
            code: 200,
            body: body.into(),
        }
    }
}

type Routes = Arc<Mutex<HashMap<String, MockResponse>>>;

pub struct MockRegistrarServer {
    port: u16,
    routes: Routes,
    hits: Arc<AtomicUsize>,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockRegistrarServer {
    /// Start a mock server on a random available port
    pub fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        listener.set_nonblocking(true)?;

        let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
        let hits = Arc::new(AtomicUsize::new(0));
        let running = Arc::new(AtomicBool::new(true));

        let thread_handle = {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits);
            let running = Arc::clone(&running);
            thread::spawn(move || {
                while running.load(Ordering::SeqCst) {
                    match listener.accept() {
                        Ok((stream, _)) => {
                            hits.fetch_add(1, Ordering::SeqCst);
                            let routes = Arc::clone(&routes);
                            thread::spawn(move || handle_connection(stream, &routes));
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                            thread::sleep(Duration::from_millis(10));
                        }
                        Err(_) => break,
                    }
                }
            })
        };

        Ok(Self {
            port,
            routes,
            hits,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    /// Register a response for `path`
    pub fn with_route(self, path: &str, response: MockResponse) -> Self {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert(path.to_string(), response);
        }
        self
    }

    /// `host:port`, the form stored under `Peer_Address`
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Number of accepted connections
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockRegistrarServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, routes: &Routes) {
    let _ = stream.set_nonblocking(false);
    let mut buffer = [0; 4096];
    let n = match stream.read(&mut buffer) {
        Ok(n) => n,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(&buffer[..n]);

    let first_line = request.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", "");
        return;
    }
    if parts[0] != "GET" {
        send_response(&mut stream, 405, "Method Not Allowed", "");
        return;
    }

    let response = routes
        .lock()
        .ok()
        .and_then(|routes| routes.get(parts[1]).cloned());

    match response {
        Some(MockResponse::Status { code, body }) => {
            let text = if code == 200 { "OK" } else { "Error" };
            send_response(&mut stream, code, text, &body);
        }
        Some(MockResponse::Truncated) => {
            let head = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{\"OK\":";
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.flush();
        }
        None => send_response(&mut stream, 404, "Not Found", r#"{"Error":"unknown user"}"#),
    }
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
