// Docker Engine API over the Unix socket, spoken by hand.
//
// One hard-coded HTTP/1.1 GET, a bounded read loop, and a structural scan
// for the JSON payload inside the chunked body. No Docker client library,
// no general chunked-transfer decoder. Best-effort: every failure mode ends
// in an empty container list.

mod payload;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::models::ContainerSummary;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const READ_TIMEOUT: Duration = Duration::from_secs(1);
/// Cap on read iterations against a slow or chatty peer.
const MAX_READS: usize = 100;
/// Cap on accumulated response bytes.
const MAX_RESPONSE_BYTES: usize = 50_000;
/// Final zero-length chunk of a chunked-transfer body.
const CHUNK_TERMINATOR: &[u8] = b"\r\n0\r\n\r\n";

const LIST_REQUEST: &[u8] =
    b"GET /containers/json?all=false HTTP/1.1\r\nHost: localhost\r\n\r\n";

pub struct DockerRepo {
    socket_path: PathBuf,
}

impl DockerRepo {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    /// Containers currently running, per the Engine list endpoint.
    /// Connection, timeout, framing and parse failures all degrade to an
    /// empty list; an error never crosses this boundary.
    pub async fn list_running_containers(&self) -> Vec<ContainerSummary> {
        match self.fetch_list_response().await {
            Ok(raw) => payload::parse_response(&raw),
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    socket = %self.socket_path.display(),
                    "docker socket unavailable"
                );
                Vec::new()
            }
        }
    }

    /// Raw response bytes from one GET against the socket. The read loop is
    /// bounded three ways: iteration count, byte budget, and per-read
    /// timeout, so a misbehaving peer cannot hold a collection pass hostage.
    async fn fetch_list_response(&self) -> io::Result<BytesMut> {
        let mut stream = timeout(CONNECT_TIMEOUT, UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;

        stream.write_all(LIST_REQUEST).await?;

        let mut response = BytesMut::with_capacity(4096);
        for _ in 0..MAX_READS {
            match timeout(READ_TIMEOUT, stream.read_buf(&mut response)).await {
                // Read timeout: work with whatever has arrived.
                Err(_) => break,
                Ok(Ok(0)) => break,
                Ok(Ok(_)) => {
                    if payload::find(&response, CHUNK_TERMINATOR).is_some()
                        || response.len() > MAX_RESPONSE_BYTES
                    {
                        break;
                    }
                }
                Ok(Err(e)) => return Err(e),
            }
        }
        Ok(response)
    }
}
