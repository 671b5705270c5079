use crate::router::Handler;
use crate::upstream::WeatherProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

/// One request has to fit in this many bytes.
const MAX_REQUEST_BYTES: usize = 8192;
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Accept connections until shutdown, dispatching each to its own task.
/// Per-connection failures are logged and dropped; serving continues.
pub async fn run<P: WeatherProvider + 'static>(
    listener: TcpListener,
    handler: Arc<Handler<P>>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("listener shutting down");
                break;
            }
            result = listener.accept() => {
                match result {
                    Ok((stream, peer)) => {
                        let handler = Arc::clone(&handler);
                        tokio::spawn(async move {
                            tracing::debug!(peer = %peer, "client connected");
                            handle_connection(stream, &handler).await;
                            tracing::debug!(peer = %peer, "client disconnected");
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept error");
                    }
                }
            }
        }
    }
}

/// Serve exactly one request on the connection, then close it. No
/// keep-alive.
async fn handle_connection<P: WeatherProvider>(mut stream: TcpStream, handler: &Handler<P>) {
    let raw = match read_request(&mut stream).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "read failed, dropping connection");
            return;
        }
    };
    if raw.is_empty() {
        tracing::debug!("no data from client");
        return;
    }

    let response = handler.handle(&raw).await;
    if let Err(e) = stream.write_all(&response.to_bytes()).await {
        tracing::warn!(error = %e, "write failed, dropping connection");
        return;
    }
    let _ = stream.shutdown().await;
}

/// Read one request: stop at the header terminator, EOF, the size cap, or
/// the read timeout. Body bytes that arrive alongside the headers are kept.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = match tokio::time::timeout(READ_TIMEOUT, stream.read(&mut chunk)).await {
            Ok(read) => read?,
            Err(_) => break, // slow client; work with what arrived
        };
        if n == 0 {
            break; // EOF
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() >= MAX_REQUEST_BYTES {
            buf.truncate(MAX_REQUEST_BYTES);
            break;
        }
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    Ok(buf)
}
