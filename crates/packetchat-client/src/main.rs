//! # packetchat
//!
//! Console front end for the chat engine.
//!
//! Reads newline-delimited JSON on stdin.  Objects with a `kind` key are push
//! events from the APRS server; objects with an `action` key are operator
//! actions.  Render instructions and outbound commands are written to stdout,
//! one JSON object per line.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use packetchat_client::bridge::{run_bridge, BridgeInput};
use packetchat_client::config::ClientConfig;
use packetchat_client::events::JsonLinesSink;
use packetchat_client::ChatSession;
use packetchat_shared::protocol::OutboundCommand;
use packetchat_store::{Database, SessionPersistence};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Tracing and configuration
    // -----------------------------------------------------------------------
    packetchat_client::init_tracing();
    info!("Starting packetchat v{}", env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 2. Restore the session
    // -----------------------------------------------------------------------
    // A damaged store never blocks startup; see `Database::open_or_reset`.
    let db_path = match config.db_path.clone() {
        Some(path) => Some(path),
        None => match Database::default_path() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "No data directory, session will not be kept");
                None
            }
        },
    };
    let db = match db_path {
        Some(path) => Database::open_or_reset(&path)?,
        None => Database::open_in_memory()?,
    };
    info!(path = ?db.path(), "Session store opened");

    let session = ChatSession::restore(SessionPersistence::new(db), config.own_callsign.clone());
    let mut sink = JsonLinesSink::new(std::io::stdout());
    session.render_all(&mut sink);

    // -----------------------------------------------------------------------
    // 3. Outbound commands -> stdout
    // -----------------------------------------------------------------------
    let (cmd_tx, cmd_rx) = mpsc::channel(config.channel_capacity);
    let printer = tokio::spawn(print_commands(cmd_rx));

    // -----------------------------------------------------------------------
    // 4. stdin -> bridge
    // -----------------------------------------------------------------------
    let (input_tx, input_rx) = mpsc::channel(config.channel_capacity);
    tokio::spawn(read_input(input_tx));

    run_bridge(session, input_rx, cmd_tx, &mut sink, &config.default_path).await;

    if let Err(e) = printer.await {
        error!(error = %e, "Command printer failed");
    }
    info!("packetchat stopped");
    Ok(())
}

/// Forward console lines to the bridge until stdin closes or Ctrl-C.
async fn read_input(input_tx: mpsc::Sender<BridgeInput>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "Failed to read stdin");
                break;
            }
        };

        match BridgeInput::from_line(&line) {
            Ok(Some(input)) => {
                if input_tx.send(input).await.is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable console line"),
        }
    }
}

async fn print_commands(mut cmd_rx: mpsc::Receiver<OutboundCommand>) {
    while let Some(command) = cmd_rx.recv().await {
        let line = match serde_json::to_string(&command) {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "Failed to encode outbound command");
                continue;
            }
        };
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            error!(error = %e, "Failed to write outbound command");
        }
    }
}
