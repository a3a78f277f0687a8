//! Interactive selection loop
//!
//! Reads selection targets (operating-hour values or `latest`) line by line
//! and re-renders the health summary for each. A reader and a renderer
//! share a `tokio::sync::watch` channel holding only the newest target, so a
//! burst of requests collapses to the last one: a selection that was not
//! yet rendered is replaced, never queued.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::processing::{summarize, summarize_by_component};
use crate::report::render_summary;
use crate::types::{Reading, Target};

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractiveStats {
    /// Valid selection requests received
    pub requests: usize,
    /// Renders actually produced, including the initial one
    pub rendered: usize,
    /// Lines that were not a valid target
    pub rejected: usize,
}

/// Render the dashboard block for `target`.
fn render_selection(readings: &[Reading], by_component: bool, target: Target) -> String {
    let result = if by_component {
        summarize_by_component(readings, target)
    } else {
        summarize(readings, target).map(|s| vec![s])
    };

    let mut out = format!("--- selection: {target} ---\n");
    match result {
        Ok(summaries) => {
            for summary in &summaries {
                out.push_str(&render_summary(summary));
                out.push('\n');
            }
        }
        Err(e) => {
            out.push_str(&format!("error: {e}\n"));
        }
    }
    out
}

/// Parse one input line. `Ok(None)` means "stop".
fn parse_command(line: &str) -> Result<Option<Target>, String> {
    let line = line.trim();
    if matches!(line.to_ascii_lowercase().as_str(), "q" | "quit" | "exit") {
        return Ok(None);
    }
    line.parse::<Target>().map(Some)
}

/// Run the selection loop until `input` ends or a quit command arrives.
///
/// The initial target is rendered before any input is read. A failed write
/// to `output` ends the session with that error, even while `input` is
/// still open.
pub async fn run_interactive<R, W>(
    readings: &[Reading],
    by_component: bool,
    initial: Target,
    input: R,
    mut output: W,
) -> std::io::Result<InteractiveStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = watch::channel(initial);
    rx.mark_changed();

    let reader = async move {
        let mut lines = input.lines();
        let mut requests = 0usize;
        let mut rejected = 0usize;
        loop {
            // Stop waiting for input once the renderer has gone away
            let next = tokio::select! {
                line = lines.next_line() => line?,
                () = tx.closed() => {
                    debug!("Renderer stopped, no longer reading selections");
                    break;
                }
            };
            let Some(line) = next else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Ok(Some(target)) => {
                    requests += 1;
                    debug!(%target, "Selection requested");
                    // Replaces any selection the renderer has not picked up yet
                    tx.send_replace(target);
                }
                Ok(None) => break,
                Err(e) => {
                    rejected += 1;
                    warn!(input = %line.trim(), "{e}");
                }
            }
        }
        // Dropping the sender lets the renderer finish after the last selection
        drop(tx);
        Ok::<_, std::io::Error>((requests, rejected))
    };

    let renderer = async move {
        // Owned by the body so an early error return closes the channel
        let mut rx = rx;
        let mut rendered = 0usize;
        while rx.changed().await.is_ok() {
            let target = *rx.borrow_and_update();
            let block = render_selection(readings, by_component, target);
            output.write_all(block.as_bytes()).await?;
            output.flush().await?;
            rendered += 1;
        }
        Ok::<_, std::io::Error>(rendered)
    };

    let (read_result, render_result) = tokio::join!(reader, renderer);
    let (requests, rejected) = read_result?;
    let rendered = render_result?;

    let stats = InteractiveStats {
        requests,
        rendered,
        rejected,
    };
    info!(
        requests = stats.requests,
        rendered = stats.rendered,
        rejected = stats.rejected,
        "Interactive session ended"
    );
    Ok(stats)
}
