//! Collector transport
//!
//! Serializes a snapshot to compact JSON, gzips it and POSTs it once to the
//! collector. The response is drained and ignored; only connection-level
//! failures are reported. There is no retry: the next scheduled cycle is
//! the retry.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use plugmetrics_telemetry::transport::SubmitClient;
//! # use plugmetrics_core::domain::Snapshot;
//!
//! # async fn example(snapshot: Snapshot) -> anyhow::Result<()> {
//! let client = SubmitClient::new();
//! client.send(&snapshot).await?;
//! # Ok(())
//! # }
//! ```

use std::io::{Read, Write};
use std::time::Duration;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use plugmetrics_core::domain::{ReporterError, Snapshot};
use plugmetrics_core::ports::ISnapshotSink;
use reqwest::header::{
    ACCEPT, CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT,
};
use reqwest::Client;
use tracing::debug;

/// Fixed collector endpoint
pub const SUBMIT_URL: &str = "https://bStats.org/submitData/bungeecord";

/// Version of the submission protocol, sent in the user agent
pub const SUBMIT_PROTOCOL_VERSION: u32 = 1;

/// Product part of the user agent
const USER_AGENT_PRODUCT: &str = "MC-Server";

/// Upper bound for one submission, TLS handshake included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `<product>/<protocol-version>`
pub fn user_agent() -> String {
    format!("{USER_AGENT_PRODUCT}/{SUBMIT_PROTOCOL_VERSION}")
}

/// Gzip the UTF-8 bytes of `payload`.
pub fn compress(payload: &str) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload.as_bytes())?;
    encoder.finish()
}

/// Inverse of [`compress`].
pub fn decompress(bytes: &[u8]) -> std::io::Result<String> {
    let mut decoded = String::new();
    GzDecoder::new(bytes).read_to_string(&mut decoded)?;
    Ok(decoded)
}

// ============================================================================
// SubmitClient
// ============================================================================

/// HTTP client posting snapshots to the collector
#[derive(Debug, Clone)]
pub struct SubmitClient {
    client: Client,
    endpoint: String,
}

impl SubmitClient {
    /// Creates a client for [`SUBMIT_URL`].
    pub fn new() -> Self {
        Self::with_endpoint(SUBMIT_URL)
    }

    /// Creates a client for a custom endpoint (useful for testing)
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends `snapshot` once.
    pub async fn send(&self, snapshot: &Snapshot) -> Result<(), ReporterError> {
        let json = snapshot.to_json()?;
        let body = compress(&json).map_err(|e| ReporterError::Serialization(e.to_string()))?;

        debug!(
            endpoint = %self.endpoint,
            plugins = snapshot.plugins.len(),
            bytes = body.len(),
            "Submitting snapshot"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(CONNECTION, "close")
            .header(CONTENT_ENCODING, "gzip")
            .header(CONTENT_LENGTH, body.len())
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, user_agent())
            .body(body)
            .send()
            .await
            .map_err(|e| ReporterError::Transport(e.to_string()))?;

        // The status is not inspected; reading the body releases the connection.
        let status = response.status();
        response
            .bytes()
            .await
            .map_err(|e| ReporterError::Transport(e.to_string()))?;

        debug!(status = %status, "Snapshot submitted");
        Ok(())
    }
}

impl Default for SubmitClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ISnapshotSink for SubmitClient {
    async fn submit(&self, snapshot: &Snapshot) -> Result<(), ReporterError> {
        self.send(snapshot).await
    }
}
