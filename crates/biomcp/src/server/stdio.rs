//! Stdio transport for MCP protocol.
//!
//! Handles line-delimited JSON-RPC 2.0 over stdin/stdout. Logs go to stderr.
//! Requests run concurrently, so responses are written in completion order.

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::rpc::{Dispatcher, JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};

/// Serve requests from stdin until EOF.
pub async fn run_stdio(dispatcher: &Dispatcher) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    serve(dispatcher, reader, writer).await
}

/// Serve line-delimited requests from any reader, writing responses to `writer`.
///
/// Returns once the reader hits EOF and every in-flight request has answered.
pub async fn serve<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut in_flight = FuturesUnordered::new();
    let mut reading = true;

    tracing::info!("MCP stdio server ready, waiting for requests...");

    loop {
        tokio::select! {
            line = lines.next_line(), if reading => {
                let Some(line) = line? else {
                    tracing::info!("Stdin closed, shutting down");
                    reading = false;
                    continue;
                };

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match serde_json::from_str::<JsonRpcRequest>(trimmed) {
                    Ok(request) => {
                        in_flight.push(async move { dispatcher.handle(&request).await });
                    }
                    Err(e) => {
                        let message = format!("Parse error: {e}");
                        let response = JsonRpcResponse::error(None, PARSE_ERROR, message);
                        write_response(&mut writer, &response).await?;
                    }
                }
            }
            Some(response) = in_flight.next(), if !in_flight.is_empty() => {
                if let Some(response) = response {
                    write_response(&mut writer, &response).await?;
                }
            }
            else => break,
        }
    }

    Ok(())
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let response_json = serde_json::to_string(response)?;
    writer.write_all(response_json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
