//! Frame replay driver: feeds hex-encoded frames from a file or stdin
//! through the forwarding pipeline and reports counters.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use fastpath_core::{ActionKind, CounterBank, CounterSnapshot, Forwarder, ForwardingTables};

/// Decode one line of the frame source. Blank lines and `#` comments yield
/// `None`; whitespace inside the hex is allowed.
fn decode_line(line: &str) -> Option<Result<Vec<u8>, hex::FromHexError>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    Some(hex::decode(compact))
}

fn process_line<T: ForwardingTables>(forwarder: &Forwarder<T>, lineno: usize, line: &str) {
    match decode_line(line) {
        None => {}
        Some(Err(err)) => warn!(lineno, %err, "skipping undecodable frame"),
        Some(Ok(mut frame)) => {
            let len = frame.len();
            let action = forwarder.process(&mut frame);
            info!(lineno, len, %action, "frame decision");
        }
    }
}

fn report(counters: &CounterBank) {
    for kind in ActionKind::ALL {
        let snap = counters.snapshot(kind);
        info!(
            action = kind.as_str(),
            packets = snap.packets,
            bytes = snap.bytes,
            "counters"
        );
    }
}

fn counter_map(counters: &CounterBank) -> BTreeMap<&'static str, CounterSnapshot> {
    ActionKind::ALL
        .iter()
        .map(|&kind| (kind.as_str(), counters.snapshot(kind)))
        .collect()
}

/// Run the replay loop to completion. A file source is drained in one go;
/// stdin is streamed with a periodic counter report until EOF or ctrl-c.
pub async fn run<T: ForwardingTables>(
    forwarder: &Forwarder<T>,
    counters: &CounterBank,
    source: Option<&str>,
    stats_interval: Duration,
    stats_json: bool,
) -> Result<()> {
    match source {
        Some(path) if path != "-" => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading frame source {path:?}"))?;
            for (index, line) in content.lines().enumerate() {
                process_line(forwarder, index + 1, line);
            }
        }
        _ => {
            info!("reading hex frames from stdin, ctrl-c to stop");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut ticker = tokio::time::interval(stats_interval);
            ticker.tick().await; // the first tick fires immediately
            let mut lineno = 0usize;
            loop {
                tokio::select! {
                    line = lines.next_line() => match line? {
                        Some(line) => {
                            lineno += 1;
                            process_line(forwarder, lineno, &line);
                        }
                        None => break,
                    },
                    _ = ticker.tick() => report(counters),
                    _ = tokio::signal::ctrl_c() => {
                        info!("interrupted");
                        break;
                    }
                }
            }
        }
    }

    if stats_json {
        println!("{}", serde_json::to_string_pretty(&counter_map(counters))?);
    } else {
        report(counters);
    }
    Ok(())
}
