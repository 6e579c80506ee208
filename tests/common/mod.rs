//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use nc_proxy::security::AdmissionControl;
use nc_proxy::{GatewayConfig, HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the mock upstream does with the n-th connection.
#[derive(Clone)]
pub enum Behaviour {
    /// Answer with a status, optional content type and body.
    Reply {
        status: u16,
        content_type: Option<&'static str>,
        body: String,
    },
    /// Like `Reply`, after a pause.
    Delayed(Duration, Box<Behaviour>),
    /// Read the request, then close without answering.
    Drop,
    /// Read the request, then never answer.
    Hang,
    /// Answer 302 pointing back at the same target.
    RedirectToSelf,
}

impl Behaviour {
    pub fn xml(status: u16, body: &str) -> Self {
        Behaviour::Reply {
            status,
            content_type: Some("text/xml; charset=utf-8"),
            body: body.to_string(),
        }
    }
}

/// A programmable upstream that records what it was asked.
pub struct MockUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    targets: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub async fn start<F>(behaviour: F) -> Self
    where
        F: Fn(usize) -> Behaviour + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let targets = Arc::new(Mutex::new(Vec::new()));
        let behaviour = Arc::new(behaviour);

        let (hit_counter, seen_targets) = (hits.clone(), targets.clone());
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let n = hit_counter.fetch_add(1, Ordering::SeqCst);
                let plan = behaviour(n);
                let seen_targets = seen_targets.clone();
                tokio::spawn(async move {
                    serve(socket, plan, seen_targets).await;
                });
            }
        });

        Self {
            addr,
            hits,
            targets,
        }
    }

    /// Always answer 200 with `body`.
    pub async fn fixed(body: &'static str) -> Self {
        Self::start(move |_| Behaviour::xml(200, body)).await
    }

    pub fn url(&self) -> String {
        format!("http://{}/xml.response", self.addr)
    }

    /// Connections accepted so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Request targets (path and query) seen so far.
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

async fn serve(mut socket: TcpStream, behaviour: Behaviour, targets: Arc<Mutex<Vec<String>>>) {
    let Some(target) = read_request_target(&mut socket).await else {
        return;
    };
    targets.lock().unwrap().push(target.clone());

    let mut behaviour = behaviour;
    loop {
        match behaviour {
            Behaviour::Delayed(pause, next) => {
                tokio::time::sleep(pause).await;
                behaviour = *next;
            }
            Behaviour::Drop => return,
            Behaviour::RedirectToSelf => {
                let response = format!(
                    "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    target
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                return;
            }
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                return;
            }
            Behaviour::Reply {
                status,
                content_type,
                body,
            } => {
                let content_type = content_type
                    .map(|ct| format!("Content-Type: {}\r\n", ct))
                    .unwrap_or_default();
                let response = format!(
                    "HTTP/1.1 {} Mock\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    content_type,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                return;
            }
        }
    }
}

/// Read request headers and return the request-line target.
async fn read_request_target(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let request_line = head.lines().next()?;
    request_line.split_whitespace().nth(1).map(str::to_string)
}

/// An in-process gateway on an ephemeral port, shut down on drop.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub admission: Arc<AdmissionControl>,
    shutdown: Shutdown,
}

impl TestGateway {
    pub async fn start(config: GatewayConfig) -> Self {
        let server = HttpServer::new(&config).expect("valid test config");
        let admission = server.admission();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            addr,
            admission,
            shutdown,
        }
    }

    pub fn nc_url(&self, query: &str) -> String {
        if query.is_empty() {
            format!("http://{}/nc", self.addr)
        } else {
            format!("http://{}/nc?{}", self.addr, query)
        }
    }

    /// Poll until `in_flight` drops to `expected`, or panic after `limit`.
    pub async fn wait_for_in_flight(&self, expected: usize, limit: Duration) {
        let deadline = tokio::time::Instant::now() + limit;
        while self.admission.in_flight() != expected {
            assert!(
                tokio::time::Instant::now() < deadline,
                "in_flight stuck at {} (expected {})",
                self.admission.in_flight(),
                expected
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Gateway config pointing at `upstream_url`, fast retries, no auth.
pub fn config_for(upstream_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.upstream.url = upstream_url.to_string();
    config.upstream.timeout_ms = 2_000;
    config.upstream.backoff_base_ms = 10;
    config.upstream.backoff_max_ms = 50;
    config
}

/// Same as [`config_for`] with Basic-Auth enabled.
pub fn config_with_auth(upstream_url: &str, username: &str, password: &str) -> GatewayConfig {
    let mut config = config_for(upstream_url);
    config.auth.username = Some(username.into());
    config.auth.password = Some(password.into());
    config
}

pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
