//! Minimal HTTP stub for exercising the client without a real backend.
//! Serves canned JSON per path and records every request line it sees.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
struct CannedResponse {
    status: u16,
    body: String,
}

pub struct TestServer {
    addr: SocketAddr,
    routes: Arc<Mutex<HashMap<String, CannedResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
    accept_task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<Mutex<HashMap<String, CannedResponse>>> = Arc::default();
        let requests: Arc<Mutex<Vec<String>>> = Arc::default();

        let accept_task = tokio::spawn({
            let routes = Arc::clone(&routes);
            let requests = Arc::clone(&requests);
            async move {
                loop {
                    let Ok((mut socket, _)) = listener.accept().await else {
                        break;
                    };
                    let routes = Arc::clone(&routes);
                    let requests = Arc::clone(&requests);
                    tokio::spawn(async move {
                        // GET requests fit in one read.
                        let mut buf = vec![0u8; 4096];
                        let Ok(n) = socket.read(&mut buf).await else {
                            return;
                        };
                        let request = String::from_utf8_lossy(&buf[..n]).into_owned();
                        let target = request
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .to_string();
                        requests.lock().unwrap().push(target.clone());

                        let path = target.split('?').next().unwrap_or("/");
                        let canned = routes.lock().unwrap().get(path).cloned().unwrap_or(
                            CannedResponse {
                                status: 404,
                                body: String::new(),
                            },
                        );
                        let reply = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            canned.status,
                            reason(canned.status),
                            canned.body.len(),
                            canned.body
                        );
                        let _ = socket.write_all(reply.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
            }
        });

        Self {
            addr,
            routes,
            requests,
            accept_task,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Registers the response served for `path` (query strings are ignored
    /// when matching).
    pub fn route(&self, path: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(
            path.to_string(),
            CannedResponse {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Every request line seen so far, path plus query, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// How many requests hit `path`, ignoring query strings.
    pub fn hits(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|target| target.split('?').next() == Some(path))
            .count()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}
