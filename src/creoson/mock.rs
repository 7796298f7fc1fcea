//! Loopback CREOSON stand-in for wire-level tests.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Answers each request with the next canned body (an empty success once the
/// list runs out) and records every request body it received.
pub struct MockCreoson {
    pub url: String,
    seen: Arc<Mutex<Vec<Value>>>,
    handle: JoinHandle<()>,
}

impl MockCreoson {
    pub async fn start(replies: Vec<Value>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let handle = tokio::spawn(async move {
            let mut replies = replies.into_iter();
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request_body(&mut stream).await;
                if request.is_null() {
                    continue;
                }
                recorded.lock().unwrap().push(request);
                let body = replies
                    .next()
                    .unwrap_or_else(|| json!({"status": {"error": false}}))
                    .to_string();
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes()).await;
                let _ = stream.write_all(body.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        Self {
            url: format!("http://{addr}/creoson"),
            seen,
            handle,
        }
    }

    /// Request bodies received so far, in order.
    pub fn requests(&self) -> Vec<Value> {
        self.seen.lock().unwrap().clone()
    }

    /// `function` of each request received so far.
    pub fn functions(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r["function"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

impl Drop for MockCreoson {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn ok(data: Value) -> Value {
    json!({"status": {"error": false}, "data": data})
}

pub fn session(id: &str) -> Value {
    json!({"status": {"error": false}, "sessionId": id})
}

async fn read_request_body(stream: &mut TcpStream) -> Value {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let Ok(n) = stream.read(&mut chunk).await else {
            return Value::Null;
        };
        if n == 0 {
            return Value::Null;
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..pos]).to_string();
        let len = head
            .lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let start = pos + 4;
        if buf.len() >= start + len {
            return serde_json::from_slice(&buf[start..start + len]).unwrap_or(Value::Null);
        }
    }
}
