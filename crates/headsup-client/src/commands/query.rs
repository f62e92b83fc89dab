//! One-shot queries: next meeting, agenda, join link.

use chrono::{DateTime, Local, Utc};

use headsup_core::{MeetingLink, NO_LINK_BODY, RenderOptions, meeting_link};
use headsup_daemon::{AppContext, LinkOpener};

use crate::error::{ClientError, ClientResult};
use crate::terminal::{BrowserOpener, status_line};

/// The status line, or its JSON report.
pub async fn next(app: &AppContext, now: DateTime<Utc>, json: bool) -> ClientResult<String> {
    let state = app.next_event_state(now).await?;
    if json {
        serde_json::to_string(&state.report(app.no_title()))
            .map_err(|e| ClientError::Action(format!("failed to encode report: {e}")))
    } else {
        Ok(status_line(&state.label_with(app.no_title()), state.icon()))
    }
}

/// The agenda grouped by local day.
pub async fn agenda(app: &AppContext, now: DateTime<Utc>, ids: bool) -> ClientResult<String> {
    let agenda = app.fetch_agenda(now).await?;
    Ok(agenda.render(
        &Local,
        &RenderOptions {
            no_title: app.no_title(),
            show_ids: ids,
        },
    ))
}

/// The join link of `event_id`.
pub async fn link(app: &AppContext, now: DateTime<Utc>, event_id: &str) -> ClientResult<MeetingLink> {
    let event = app
        .find_event(now, event_id)
        .await?
        .ok_or_else(|| ClientError::Action(format!("no event with id {event_id}")))?;
    meeting_link(&event).ok_or_else(|| ClientError::Action(NO_LINK_BODY.to_string()))
}

/// Prints the link of `event_id`, opening it when asked.
pub async fn print_link(
    app: &AppContext,
    now: DateTime<Utc>,
    event_id: &str,
    open: bool,
) -> ClientResult<()> {
    let link = link(app, now, event_id).await?;
    println!("{} ({})", link.url, link.service);
    if open {
        BrowserOpener
            .open(&link.url)
            .map_err(|e| ClientError::Action(format!("failed to open URL: {e}")))?;
    }
    Ok(())
}
