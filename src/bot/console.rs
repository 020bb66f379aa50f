//! Console transport: one message per stdin line, replies on stdout.
//! Documents are written into a directory instead of being uploaded.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use super::router::{self, FAILURE_TEXT, Reply};
use crate::application::LedgerService;

/// Feed every input line to the router until EOF. Returns the number of
/// lines handled.
pub async fn run<R, W>(
    service: &LedgerService,
    input: R,
    mut output: W,
    export_dir: &Path,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let today = Local::now().date_naive();
        match router::handle_input(service, line, today).await {
            Ok(Reply::Text(reply)) => writeln!(output, "{}", reply)?,
            Ok(Reply::Document { file_name, bytes }) => {
                let path = export_dir.join(&file_name);
                std::fs::write(&path, &bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                writeln!(output, "📄 Saved {} ({} bytes)", path.display(), bytes.len())?;
            }
            Err(e) => {
                warn!("failed to handle message: {e:#}");
                writeln!(output, "{}", FAILURE_TEXT)?;
            }
        }
        output.flush()?;
        handled += 1;
    }

    Ok(handled)
}
