//! Stdio transport for MCP protocol.
//!
//! Handles newline-delimited JSON-RPC 2.0 over stdin/stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::transport::{ServerState, handle_message};

/// Handle MCP protocol over the process's stdin and stdout.
pub async fn run_stdio(state: &ServerState) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();

    tracing::info!("MCP stdio server ready, waiting for requests...");
    serve_lines(state, reader, writer).await?;
    tracing::info!("Stdin closed, shutting down");

    Ok(())
}

/// Answer one JSON-RPC message per input line until EOF.
///
/// # Errors
///
/// Returns error on I/O failure.
pub async fn serve_lines<R, W>(state: &ServerState, mut reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some(response) = handle_message(state, trimmed).await else {
            continue;
        };

        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}
