//! The alert loop and single alerts, with keys read from stdin.

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use headsup_core::{AlertInput, Dismissal};
use headsup_daemon::{AppContext, Shutdown};

use crate::error::{ClientError, ClientResult};

/// Runs until SIGINT/SIGTERM, or until access is denied.
pub async fn run(app: AppContext) -> ClientResult<()> {
    let shutdown = Shutdown::new();
    shutdown.listen_for_signals()?;

    let (tx, rx) = mpsc::channel(8);
    let reader = spawn_key_reader(tx);
    let result = app.run(rx, shutdown).await;
    reader.abort();
    Ok(result?)
}

/// Shows the alert for `event_id` and waits for a key.
pub async fn alert(mut app: AppContext, now: DateTime<Utc>, event_id: &str) -> ClientResult<()> {
    let event = app
        .find_event(now, event_id)
        .await?
        .ok_or_else(|| ClientError::Action(format!("no event with id {event_id}")))?;

    let (tx, mut rx) = mpsc::channel(8);
    let reader = spawn_key_reader(tx);
    let dismissal = app.run_alert(event, &mut rx).await;
    reader.abort();

    match dismissal {
        Some(Dismissal::Join(link)) => info!(url = %link.url, "Joined"),
        Some(other) => debug!(?other, "Alert dismissed"),
        None => debug!("Input closed"),
    }
    Ok(())
}

/// Forwards alert keys typed on stdin, one per line.
fn spawn_key_reader(tx: mpsc::Sender<AlertInput>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let Some(input) = AlertInput::from_key(&line) else {
                debug!(line = %line, "Ignoring input");
                continue;
            };
            if tx.send(input).await.is_err() {
                break;
            }
        }
    })
}
