//! Newline-delimited transport loop.
//!
//! Each request line is handled on its own task so a long transcription
//! does not hold up `tools/list` or `ping`. Responses are written by a
//! single writer task, one JSON object per line, in completion order.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::rpc::{RpcResponse, RpcServer};

/// Serve requests from `reader` until it reaches end of input, then wait
/// for in-flight requests to finish.
pub async fn serve<R, W>(server: Arc<RpcServer>, reader: R, writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<RpcResponse>();
    let writer_task = tokio::spawn(write_responses(rx, writer));

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let server = Arc::clone(&server);
        let tx = tx.clone();
        drop(tokio::spawn(async move {
            if let Some(response) = server.handle_line(&line).await {
                if tx.send(response).is_err() {
                    warn!("response dropped, writer has stopped");
                }
            }
        }));
    }
    info!("input closed, draining in-flight requests");
    drop(tx);

    writer_task.await.map_err(io::Error::other)?
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<RpcResponse>, mut writer: W) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response).map_err(io::Error::other)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    writer.shutdown().await
}
