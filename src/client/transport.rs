//! Transport seam: how one request reaches the server.
//!
//! `HttpTransport` is the real implementation on top of `reqwest`. The retry
//! loop only sees `RawResponse` or a `WeapmError::Transport`, so tests can
//! swap in a scripted transport.

use std::future::Future;
use std::time::Instant;

use tracing::{info, warn};
use url::Url;

use super::request::ApiRequest;
use crate::config::Config;
use crate::error::{Result, WeapmError};

/// Status and full body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body as text, lossy, for error messages.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends a single request. Implementations must not retry on their own.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &ApiRequest,
        url: &Url,
    ) -> impl Future<Output = Result<RawResponse>> + Send;
}

/// `reqwest`-backed transport with basic auth and optional request logging.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    username: String,
    password: String,
    log_requests: bool,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("username", &self.username)
            .field("log_requests", &self.log_requests)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_connections)
            .user_agent(concat!("weapm-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeapmError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            username: config.username.clone(),
            password: config.password.clone(),
            log_requests: config.enable_logging,
        })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest, url: &Url) -> Result<RawResponse> {
        let started = Instant::now();
        if self.log_requests {
            info!(method = %request.method, url = %url, "sending request");
        }

        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .basic_auth(&self.username, Some(&self.password));
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                if self.log_requests {
                    warn!(method = %request.method, url = %url, error = %e, "request failed");
                }
                return Err(e.into());
            }
        };

        let status = response.status().as_u16();
        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                if self.log_requests {
                    warn!(method = %request.method, url = %url, status, error = %e, "request failed");
                }
                return Err(WeapmError::Transport(format!(
                    "failed to read response body: {e}"
                )));
            }
        };

        if self.log_requests {
            info!(
                method = %request.method,
                url = %url,
                status,
                elapsed_secs = started.elapsed().as_secs_f64(),
                "received response"
            );
        }
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use reqwest::Method;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Replays canned outcomes in order and records what was sent.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<RawResponse>>>,
        pub(crate) seen: Mutex<Vec<(Method, String, Option<serde_json::Value>)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(outcomes: Vec<Result<RawResponse>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn ok_json(value: serde_json::Value) -> Result<RawResponse> {
            Ok(RawResponse::new(200, value.to_string()))
        }

        pub(crate) fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        pub(crate) fn last_url(&self) -> String {
            self.seen.lock().unwrap().last().unwrap().1.clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, request: &ApiRequest, url: &Url) -> Result<RawResponse> {
            self.seen.lock().unwrap().push((
                request.method.clone(),
                url.to_string(),
                request.body.clone(),
            ));
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(WeapmError::Transport("script exhausted".into())))
        }
    }

    /// Accept one connection, capture the raw request, answer with `reply_body`.
    async fn serve_once(
        listener: TcpListener,
        status_line: &'static str,
        reply_body: &'static str,
    ) -> String {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply_body}",
            reply_body.len()
        );
        sock.write_all(response.as_bytes()).await.unwrap();
        sock.shutdown().await.ok();
        String::from_utf8_lossy(&buf).to_string()
    }

    fn test_config(base: &str) -> Config {
        let mut cfg = Config::with_base_url(base).unwrap();
        cfg.username = "weapmUser".into();
        cfg.password = "pw".into();
        cfg
    }

    #[tokio::test]
    async fn http_transport_sends_auth_and_json_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(
            listener,
            "HTTP/1.1 200 OK",
            r#"{"code":0,"message":"ok"}"#,
        ));

        let cfg = test_config(&format!("http://{addr}"));
        let transport = HttpTransport::new(&cfg).unwrap();
        let req = ApiRequest::new(Method::POST, ["operation", "subsystem"])
            .with_json(&serde_json::json!({"subSystemId": "SYS001"}))
            .unwrap();
        let url = req.url(&cfg.base_url).unwrap();

        let resp = transport.send(&req, &url).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.text(), r#"{"code":0,"message":"ok"}"#);

        let raw = server.await.unwrap();
        let lower = raw.to_ascii_lowercase();
        assert!(raw.starts_with("POST /operation/subsystem HTTP/1.1"));
        // base64("weapmUser:pw")
        assert!(raw.contains("d2VhcG1Vc2VyOnB3"));
        assert!(lower.contains("content-type: application/json"));
        assert!(raw.ends_with(r#"{"subSystemId":"SYS001"}"#));
    }

    #[tokio::test]
    async fn http_transport_passes_error_status_through() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(
            listener,
            "HTTP/1.1 503 Service Unavailable",
            "busy",
        ));

        let cfg = test_config(&format!("http://{addr}"));
        let transport = HttpTransport::new(&cfg).unwrap();
        let req = ApiRequest::get(["operation", "dashboard"]);
        let url = req.url(&cfg.base_url).unwrap();

        let resp = transport.send(&req, &url).await.unwrap();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.text(), "busy");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let addr = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };
        let cfg = test_config(&format!("http://{addr}"));
        let transport = HttpTransport::new(&cfg).unwrap();
        let req = ApiRequest::get(["operation", "clusters"]);
        let url = req.url(&cfg.base_url).unwrap();

        let err = transport.send(&req, &url).await.unwrap_err();
        assert!(err.is_retryable());
    }

    /// Collects formatted log lines written by a scoped subscriber.
    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogCapture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Run one request against a 200 stub with `enable_logging` set as given.
    async fn send_logged(enable_logging: bool) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(listener, "HTTP/1.1 200 OK", r#"{"code":0}"#));

        let mut cfg = test_config(&format!("http://{addr}"));
        cfg.enable_logging = enable_logging;
        let transport = HttpTransport::new(&cfg).unwrap();
        let req = ApiRequest::get(["operation", "dashboard"]);
        let url = req.url(&cfg.base_url).unwrap();

        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        transport.send(&req, &url).await.unwrap();
        server.await.unwrap();
        capture.text()
    }

    #[tokio::test]
    async fn request_logging_follows_config() {
        let on = send_logged(true).await;
        assert!(on.contains("sending request"), "{on}");
        assert!(on.contains("received response"), "{on}");
        assert!(on.contains("status=200"), "{on}");

        let off = send_logged(false).await;
        assert!(!off.contains("sending request"), "{off}");
        assert!(!off.contains("received response"), "{off}");
    }

    #[tokio::test]
    async fn truncated_body_is_logged_and_retryable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut chunk = [0u8; 1024];
            let _ = sock.read(&mut chunk).await.unwrap();
            // Promise more bytes than are sent, then hang up.
            sock.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"code\"")
                .await
                .unwrap();
            sock.shutdown().await.ok();
        });

        let cfg = test_config(&format!("http://{addr}"));
        let transport = HttpTransport::new(&cfg).unwrap();
        let req = ApiRequest::get(["operation", "clusters"]);
        let url = req.url(&cfg.base_url).unwrap();

        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let err = transport.send(&req, &url).await.unwrap_err();
        server.await.unwrap();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("failed to read response body"));
        let logs = capture.text();
        assert!(logs.contains("request failed"), "{logs}");
    }
}
