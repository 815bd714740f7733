//! NATS Sink - Publish documents to NATS subjects
//!
//! Speaks the NATS core client protocol directly over TCP. Each document is
//! published once to the subject given by the event's destination template.
//!
//! # Protocol
//!
//! ```text
//! server: INFO {...}\r\n
//! client: CONNECT {"verbose":false,"pedantic":false,...}\r\n
//! client: PING\r\n
//! server: PONG\r\n                  (handshake accepted)
//! client: PUB <subject> <len>\r\n<payload>\r\n
//! server: PING\r\n   client: PONG\r\n   (keep-alive, any time)
//! ```
//!
//! A background reader answers server PINGs and notices when the server
//! closes the connection. The next write after a failure reconnects; writes
//! are never retried. Documents larger than the `max_payload` announced in
//! INFO are rejected locally, since the server would drop them with only an
//! asynchronous `-ERR`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use hookbus_config::NatsConfig;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::common::{MetricsSnapshot, Sink, SinkError, SinkMetrics};

#[cfg(test)]
#[path = "nats_test.rs"]
mod tests;

/// Configuration for the NATS sink
#[derive(Debug, Clone)]
pub struct NatsSinkConfig {
    /// Server address (host:port), scheme already stripped
    pub address: String,

    /// Client name announced in CONNECT
    pub name: String,

    /// Timeout for TCP connect plus handshake
    pub connection_timeout: Duration,

    /// Timeout per publish
    pub write_timeout: Duration,
}

impl NatsSinkConfig {
    /// Create a config for `url`, accepting `nats://host:port` or `host:port`
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Config` if the url has no address.
    pub fn new(url: &str) -> Result<Self, SinkError> {
        Ok(Self {
            address: server_address(url)?,
            name: "hookbus".into(),
            connection_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(5),
        })
    }

    /// Build from the `[nats]` config section
    pub fn from_config(config: &NatsConfig) -> Result<Self, SinkError> {
        Ok(Self::new(&config.url)?
            .with_name(config.name.clone())
            .with_connection_timeout(config.connection_timeout)
            .with_write_timeout(config.write_timeout))
    }

    /// Set client name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set connection timeout
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set write timeout
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// CONNECT options sent during the handshake
#[derive(Debug, Serialize)]
struct ConnectOptions<'a> {
    verbose: bool,
    pedantic: bool,
    name: &'a str,
    lang: &'static str,
    version: &'static str,
    protocol: u8,
}

/// Fields of the server INFO greeting the sink uses
#[derive(Debug, Default, Deserialize)]
struct ServerInfo {
    #[serde(default)]
    max_payload: Option<u64>,
}

impl ServerInfo {
    /// Parse the JSON after `INFO`; unparseable info means no known limits
    fn parse(greeting: &str) -> Self {
        let body = greeting.strip_prefix("INFO").unwrap_or(greeting).trim();
        match serde_json::from_str(body) {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!(sink = "nats", error = %e, "unparseable INFO, ignoring");
                Self::default()
            }
        }
    }
}

/// One established server connection
struct Connection {
    writer: Arc<Mutex<OwnedWriteHalf>>,
    alive: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    /// Largest payload the server accepts, if announced
    max_payload: Option<u64>,
}

impl Connection {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Sink publishing each document to a NATS subject
pub struct NatsSink {
    config: NatsSinkConfig,

    /// Current connection, replaced after a failure
    connection: Mutex<Option<Connection>>,

    closed: AtomicBool,

    metrics: SinkMetrics,
}

impl NatsSink {
    /// Create a sink; no connection is made until `connect` or the first write
    pub fn new(config: NatsSinkConfig) -> Self {
        Self {
            config,
            connection: Mutex::new(None),
            closed: AtomicBool::new(false),
            metrics: SinkMetrics::new(),
        }
    }

    /// Server address this sink publishes to
    pub fn address(&self) -> &str {
        &self.config.address
    }

    /// Establish the connection now instead of on the first write
    pub async fn connect(&self) -> Result<(), SinkError> {
        let mut conn = self.connection.lock().await;
        *conn = Some(self.establish().await?);
        Ok(())
    }

    /// Whether a live connection is currently held
    pub async fn is_connected(&self) -> bool {
        self.connection
            .lock()
            .await
            .as_ref()
            .is_some_and(Connection::is_alive)
    }

    async fn establish(&self) -> Result<Connection, SinkError> {
        let address = &self.config.address;
        let connection = timeout(self.config.connection_timeout, self.handshake())
            .await
            .map_err(|_| SinkError::connection(address, "connection timed out"))??;

        self.metrics.connected();
        tracing::info!(sink = "nats", server = %address, "connected to NATS server");
        Ok(connection)
    }

    async fn handshake(&self) -> Result<Connection, SinkError> {
        let address = &self.config.address;
        let stream = TcpStream::connect(address)
            .await
            .map_err(|e| SinkError::connection(address, e.to_string()))?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(sink = "nats", error = %e, "failed to set TCP_NODELAY");
        }

        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let greeting = read_control_line(&mut reader, address).await?;
        if !greeting.starts_with("INFO") {
            return Err(SinkError::connection(
                address,
                format!("unexpected greeting {:?}", greeting),
            ));
        }
        let info = ServerInfo::parse(&greeting);

        let options = ConnectOptions {
            verbose: false,
            pedantic: false,
            name: &self.config.name,
            lang: "rust",
            version: env!("CARGO_PKG_VERSION"),
            protocol: 0,
        };
        let mut frame = b"CONNECT ".to_vec();
        serde_json::to_writer(&mut frame, &options)
            .map_err(|e| SinkError::connection(address, e.to_string()))?;
        frame.extend_from_slice(b"\r\nPING\r\n");
        write_half.write_all(&frame).await?;
        write_half.flush().await?;

        let reply = read_control_line(&mut reader, address).await?;
        if let Some(message) = reply.strip_prefix("-ERR") {
            return Err(SinkError::connection(address, message.trim()));
        }
        if reply != "PONG" {
            return Err(SinkError::connection(
                address,
                format!("unexpected handshake reply {:?}", reply),
            ));
        }

        let writer = Arc::new(Mutex::new(write_half));
        let alive = Arc::new(AtomicBool::new(true));
        let reader = tokio::spawn(read_loop(reader, Arc::clone(&writer), Arc::clone(&alive)));

        Ok(Connection {
            writer,
            alive,
            reader,
            max_payload: info.max_payload,
        })
    }
}

#[async_trait]
impl Sink for NatsSink {
    fn name(&self) -> &str {
        "nats"
    }

    async fn write(&self, destination: &str, document: Bytes) -> Result<(), SinkError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed(self.name().to_string()));
        }
        validate_subject(destination)?;

        let frame = publish_frame(destination, &document);

        let mut conn = self.connection.lock().await;
        let connection = match conn.take() {
            Some(c) if c.is_alive() => c,
            stale => {
                if stale.is_some() {
                    tracing::warn!(sink = "nats", "connection lost, reconnecting");
                }
                drop(stale);
                match self.establish().await {
                    Ok(c) => c,
                    Err(e) => {
                        self.metrics.write_error();
                        return Err(e);
                    }
                }
            }
        };

        if let Some(limit) = connection
            .max_payload
            .filter(|limit| document.len() as u64 > *limit)
        {
            *conn = Some(connection);
            self.metrics.write_error();
            return Err(SinkError::write(format!(
                "document of {} bytes exceeds server max_payload of {} bytes",
                document.len(),
                limit
            )));
        }

        let result = timeout(self.config.write_timeout, async {
            let mut writer = connection.writer.lock().await;
            writer.write_all(&frame).await?;
            writer.flush().await
        })
        .await;

        match result {
            Ok(Ok(())) => {
                *conn = Some(connection);
                self.metrics.document_written(document.len() as u64);
                tracing::debug!(sink = "nats", subject = %destination, bytes = document.len(), "published document");
                Ok(())
            }
            Ok(Err(e)) => {
                self.metrics.write_error();
                Err(SinkError::write(e.to_string()))
            }
            Err(_) => {
                self.metrics.write_error();
                Err(SinkError::Timeout {
                    operation: "publish",
                })
            }
        }
    }

    async fn connect(&self) -> Result<(), SinkError> {
        NatsSink::connect(self).await
    }

    async fn close(&self) -> Result<(), SinkError> {
        self.closed.store(true, Ordering::Release);

        let connection = self.connection.lock().await.take();
        if let Some(connection) = connection {
            let mut writer = connection.writer.lock().await;
            if let Err(e) = writer.shutdown().await {
                tracing::debug!(sink = "nats", error = %e, "error shutting down connection");
            }
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            sink = "nats",
            documents_written = snapshot.documents_written,
            bytes_written = snapshot.bytes_written,
            write_errors = snapshot.write_errors,
            connects = snapshot.connects,
            "nats sink closed"
        );
        Ok(())
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Answer keep-alives until the server goes away
async fn read_loop(
    mut reader: BufReader<OwnedReadHalf>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
    alive: Arc<AtomicBool>,
) {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                tracing::debug!(sink = "nats", "server closed connection");
                break;
            }
            Ok(_) => {
                let op = line.trim_end();
                if op == "PING" {
                    let mut w = writer.lock().await;
                    if let Err(e) = w.write_all(b"PONG\r\n").await {
                        tracing::warn!(sink = "nats", error = %e, "failed to answer PING");
                        break;
                    }
                } else if let Some(message) = op.strip_prefix("-ERR") {
                    tracing::warn!(sink = "nats", error = %message.trim(), "server reported an error");
                } else {
                    tracing::trace!(sink = "nats", op = %op, "ignored server message");
                }
            }
            Err(e) => {
                tracing::warn!(sink = "nats", error = %e, "connection read failed");
                break;
            }
        }
    }
    alive.store(false, Ordering::Release);
}

async fn read_control_line(
    reader: &mut BufReader<OwnedReadHalf>,
    address: &str,
) -> Result<String, SinkError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(SinkError::connection(address, "closed by server during handshake"));
    }
    Ok(line.trim_end().to_string())
}

fn publish_frame(subject: &str, payload: &[u8]) -> Vec<u8> {
    let header = format!("PUB {} {}\r\n", subject, payload.len());
    let mut frame = Vec::with_capacity(header.len() + payload.len() + 2);
    frame.extend_from_slice(header.as_bytes());
    frame.extend_from_slice(payload);
    frame.extend_from_slice(b"\r\n");
    frame
}

fn validate_subject(subject: &str) -> Result<(), SinkError> {
    if subject.is_empty() {
        return Err(SinkError::write("empty subject"));
    }
    if subject.chars().any(char::is_whitespace) {
        return Err(SinkError::write(format!(
            "subject {:?} contains whitespace",
            subject
        )));
    }
    Ok(())
}

/// Strip the `nats://` scheme and any trailing slash
fn server_address(url: &str) -> Result<String, SinkError> {
    let address = url
        .trim()
        .strip_prefix("nats://")
        .unwrap_or(url.trim())
        .trim_end_matches('/');
    if address.is_empty() {
        return Err(SinkError::config(format!("invalid NATS url {:?}", url)));
    }
    Ok(address.to_string())
}
