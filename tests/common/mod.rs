//! Test helpers for integration tests.
//!
//! Provides a minimal HTTP server serving canned feed responses, and state
//! setup for running commands against a throwaway database.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use gator::{Command, Config, Database, State};

/// A sample RSS document.
pub const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test &amp;amp; Feed</title>
    <link>https://example.com</link>
    <description>A feed for tests</description>
    <item>
      <title>Hello</title>
      <link>https://example.com/hello</link>
      <description>First post</description>
      <pubDate>Mon, 02 Jan 2006 15:04:05 -0700</pubDate>
    </item>
  </channel>
</rss>"#;

/// Canned response served by [`StubServer`].
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl StubResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// HTTP server answering every request with the same response.
pub struct StubServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl StubServer {
    /// Start serving `response` on a random local port.
    pub async fn start(response: StubResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let response = response.clone();

                tokio::spawn(async move {
                    // Read the request head; the body of a GET is empty
                    let mut buf = vec![0u8; 4096];
                    let mut read = 0;
                    while read < buf.len() {
                        match stream.read(&mut buf[read..]).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => {
                                read += n;
                                if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                                    break;
                                }
                            }
                        }
                    }

                    tokio::time::sleep(response.delay).await;

                    let head = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        response.status,
                        reason(response.status),
                        response.body.len()
                    );
                    let _ = stream.write_all(head.as_bytes()).await;
                    let _ = stream.write_all(response.body.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self { addr, hits }
    }

    /// URL of a feed served by this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Number of connections accepted so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Command state over a fresh in-memory database, capturing output.
pub async fn setup_state() -> (State, TempDir) {
    let db = Database::open_in_memory().await.unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".gatorconfig.json");
    (State::captured(db, Config::default(), path), dir)
}

/// Build a command from string slices.
pub fn cmd(name: &str, args: &[&str]) -> Command {
    Command::new(name, args.iter().map(|a| a.to_string()).collect())
}
