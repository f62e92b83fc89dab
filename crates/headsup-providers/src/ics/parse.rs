//! iCalendar (RFC 5545) parsing into [`Event`]s.
//!
//! Recurring series are expanded into one event per occurrence inside the
//! query window, with id `<uid>@<start>`. A VEVENT carrying RECURRENCE-ID
//! replaces the occurrence it names, or removes it when cancelled.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz as NamedTz;
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, EventLike,
};
use tracing::{debug, warn};

use headsup_core::{Event, TimeWindow};

use super::recur::{Recurrence, instance_id};
use crate::error::{ProviderError, ProviderResult};

/// An instance moved, retitled or cancelled by its own VEVENT.
struct Override {
    uid: String,
    /// Start of the occurrence it replaces.
    original: DateTime<Utc>,
    cancelled: bool,
    event: Event,
}

/// Parses ICS text into events, expanding series within `window`.
///
/// Floating times and all-day dates are read in `local`. VEVENTs without a
/// UID or start are skipped. Events outside `window` may still be returned.
pub fn parse_ics<Tz: TimeZone>(
    ics: &str,
    local: &Tz,
    window: &TimeWindow,
) -> ProviderResult<Vec<Event>> {
    let calendar = ics
        .parse::<Calendar>()
        .map_err(|e| ProviderError::invalid_data(format!("failed to parse calendar: {e}")))?;

    let vevents: Vec<_> = calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(event),
            _ => None,
        })
        .collect();
    let mut recurrences = Recurrence::scan(ics);
    if recurrences.len() != vevents.len() {
        warn!(
            vevents = vevents.len(),
            scanned = recurrences.len(),
            "VEVENT count mismatch, ignoring recurrence"
        );
        recurrences.clear();
    }

    let mut series = Vec::new();
    let mut overrides = Vec::new();
    for (index, vevent) in vevents.into_iter().enumerate() {
        let recurrence = recurrences.get(index).cloned().unwrap_or_default();
        let Some(event) = convert_event(vevent, local) else {
            continue;
        };
        match recurrence.recurrence_id(local) {
            Some(original) => overrides.push(Override {
                uid: event.id.clone(),
                original,
                cancelled: vevent
                    .property_value("STATUS")
                    .is_some_and(|status| status.eq_ignore_ascii_case("CANCELLED")),
                event,
            }),
            None => series.push((vevent, event, recurrence)),
        }
    }

    let mut events = Vec::new();
    for (vevent, master, recurrence) in &series {
        if !recurrence.is_series() {
            events.push(master.clone());
            continue;
        }
        let Some(dtstart) = vevent.get_start() else {
            continue;
        };
        let length = master.end - master.start;
        let starts = recurrence.starts(&dtstart, master.start, length, local, window);
        debug!(uid = %master.id, count = starts.len(), "Expanded series");
        events.extend(
            starts
                .into_iter()
                .filter(|start| {
                    !overrides
                        .iter()
                        .any(|o| o.uid == master.id && o.original == *start)
                })
                .map(|start| Event {
                    id: instance_id(&master.id, start),
                    start,
                    end: start + length,
                    ..master.clone()
                }),
        );
    }

    for Override {
        uid,
        original,
        cancelled,
        event,
    } in overrides
    {
        if cancelled {
            debug!(%uid, %original, "Occurrence cancelled");
            continue;
        }
        let master = series
            .iter()
            .map(|(_, master, _)| master)
            .find(|master| master.id == uid);
        events.push(Event {
            id: instance_id(&uid, original),
            title: event.title.or_else(|| master.and_then(|m| m.title.clone())),
            url: event.url.or_else(|| master.and_then(|m| m.url.clone())),
            notes: event.notes.or_else(|| master.and_then(|m| m.notes.clone())),
            ..event
        });
    }
    Ok(events)
}

fn convert_event<Tz: TimeZone>(event: &icalendar::Event, local: &Tz) -> Option<Event> {
    let Some(uid) = event.get_uid() else {
        warn!(summary = ?event.get_summary(), "Skipping VEVENT without UID");
        return None;
    };
    let start = to_utc(event.get_start()?, local)?;
    let end = match event.get_end() {
        Some(end) => to_utc(end, local).unwrap_or(start),
        None => start,
    };

    let mut converted = Event::new(uid, start, end.max(start));
    if let Some(summary) = event.get_summary().filter(|s| !s.trim().is_empty()) {
        converted = converted.with_title(summary);
    }
    if let Some(url) = event.property_value("URL") {
        converted = converted.with_url(url);
    }
    if let Some(description) = event.get_description() {
        converted = converted.with_notes(description);
    }

    debug!(uid = %converted.id, start = %converted.start, "Parsed event from ICS");
    Some(converted)
}

pub(super) fn to_utc<Tz: TimeZone>(value: DatePerhapsTime, local: &Tz) -> Option<DateTime<Utc>> {
    match value {
        DatePerhapsTime::Date(date) => date_in(date, local),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => naive_in(&naive, local),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            match tzid.parse::<NamedTz>() {
                Ok(tz) => naive_in(&date_time, &tz),
                Err(_) => {
                    warn!(%tzid, "Unknown TZID, reading time as local");
                    naive_in(&date_time, local)
                }
            }
        }
    }
}

pub(super) fn naive_in<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn date_in<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    naive_in(&date.and_hms_opt(0, 0, 0)?, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn wrap(body: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//headsup//test//EN\r\n{body}END:VCALENDAR\r\n"
        )
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn any_time() -> TimeWindow {
        TimeWindow::new(utc(2026, 1, 1, 0, 0), utc(2027, 1, 1, 0, 0))
    }

    fn in_window(events: Vec<Event>, window: &TimeWindow) -> Vec<Event> {
        crate::provider::select_window(events, window)
    }

    const STANDUP: &str = "BEGIN:VEVENT\r\n\
                           UID:standup\r\n\
                           DTSTART;TZID=Europe/Berlin:20261001T100000\r\n\
                           DTEND;TZID=Europe/Berlin:20261001T101500\r\n\
                           RRULE:FREQ=WEEKLY\r\n\
                           SUMMARY:Standup\r\n\
                           DESCRIPTION:https://meet.google.com/abc-defg-hij\r\n\
                           END:VEVENT\r\n";

    #[test]
    fn utc_event_with_notes_and_url() {
        let ics = wrap(
            "BEGIN:VEVENT\r\n\
             UID:standup@example.com\r\n\
             DTSTART:20261016T100000Z\r\n\
             DTEND:20261016T103000Z\r\n\
             SUMMARY:Team Standup\r\n\
             DESCRIPTION:Join: https://zoom.us/j/123456789\r\n\
             URL:https://example.com/standup\r\n\
             END:VEVENT\r\n",
        );
        let events = parse_ics(&ics, &Utc, &any_time()).unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.id, "standup@example.com");
        assert_eq!(event.title.as_deref(), Some("Team Standup"));
        assert_eq!(event.start, utc(2026, 10, 16, 10, 0));
        assert_eq!(event.end, utc(2026, 10, 16, 10, 30));
        assert_eq!(event.url.as_deref(), Some("https://example.com/standup"));
        assert!(event.notes.as_deref().unwrap().contains("zoom.us"));
    }

    #[test]
    fn named_timezone_is_resolved() {
        let ics = wrap(
            "BEGIN:VEVENT\r\n\
             UID:berlin\r\n\
             DTSTART;TZID=Europe/Berlin:20261016T100000\r\n\
             DTEND;TZID=Europe/Berlin:20261016T110000\r\n\
             END:VEVENT\r\n",
        );
        let events = parse_ics(&ics, &Utc, &any_time()).unwrap();
        // CEST is UTC+2 in October before the switch.
        assert_eq!(events[0].start, utc(2026, 10, 16, 8, 0));
        assert_eq!(events[0].title, None);
    }

    #[test]
    fn floating_and_all_day_use_local_zone() {
        let ics = wrap(
            "BEGIN:VEVENT\r\n\
             UID:floating\r\n\
             DTSTART:20261016T090000\r\n\
             DTEND:20261016T093000\r\n\
             END:VEVENT\r\n\
             BEGIN:VEVENT\r\n\
             UID:holiday\r\n\
             DTSTART;VALUE=DATE:20261017\r\n\
             DTEND;VALUE=DATE:20261018\r\n\
             SUMMARY:Holiday\r\n\
             END:VEVENT\r\n",
        );
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let events = parse_ics(&ics, &plus_two, &any_time()).unwrap();
        assert_eq!(events[0].start, utc(2026, 10, 16, 7, 0));
        assert_eq!(events[1].start, utc(2026, 10, 16, 22, 0));
        assert_eq!(events[1].end, utc(2026, 10, 17, 22, 0));
    }

    #[test]
    fn missing_end_collapses_to_start() {
        let ics = wrap(
            "BEGIN:VEVENT\r\n\
             UID:reminder\r\n\
             DTSTART:20261016T120000Z\r\n\
             END:VEVENT\r\n",
        );
        let events = parse_ics(&ics, &Utc, &any_time()).unwrap();
        assert_eq!(events[0].start, events[0].end);
    }

    #[test]
    fn weekly_series_yields_occurrence_in_lookahead() {
        let ics = wrap(STANDUP);
        let window = TimeWindow::lookahead(utc(2026, 10, 15, 0, 0));
        let events = in_window(parse_ics(&ics, &Utc, &window).unwrap(), &window);

        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["standup@20261015T080000Z"]);
        assert_eq!(events[0].end, utc(2026, 10, 15, 8, 15));
        assert_eq!(events[0].title.as_deref(), Some("Standup"));
        assert!(events[0].notes.is_some());
    }

    #[test]
    fn series_keeps_wall_time_across_dst() {
        let ics = wrap(STANDUP);
        let window = TimeWindow::new(utc(2026, 10, 20, 0, 0), utc(2026, 11, 1, 0, 0));
        let starts: Vec<_> = in_window(parse_ics(&ics, &Utc, &window).unwrap(), &window)
            .into_iter()
            .map(|e| e.start)
            .collect();
        // Berlin leaves CEST on 25 October.
        assert_eq!(starts, [utc(2026, 10, 22, 8, 0), utc(2026, 10, 29, 9, 0)]);
    }

    #[test]
    fn exdate_and_overrides() {
        let ics = wrap(&format!(
            "{}\
             BEGIN:VEVENT\r\n\
             UID:standup\r\n\
             RECURRENCE-ID;TZID=Europe/Berlin:20261008T100000\r\n\
             DTSTART;TZID=Europe/Berlin:20261008T113000\r\n\
             DTEND;TZID=Europe/Berlin:20261008T114500\r\n\
             SUMMARY:Standup (moved)\r\n\
             END:VEVENT\r\n\
             BEGIN:VEVENT\r\n\
             UID:standup\r\n\
             RECURRENCE-ID:20261022T080000Z\r\n\
             DTSTART:20261022T080000Z\r\n\
             STATUS:CANCELLED\r\n\
             END:VEVENT\r\n",
            STANDUP.replace(
                "SUMMARY:Standup\r\n",
                "SUMMARY:Standup\r\nEXDATE;TZID=Europe/Berlin:20261015T100000\r\n",
            )
        ));
        let window = TimeWindow::new(utc(2026, 10, 1, 0, 0), utc(2026, 10, 30, 0, 0));
        let events = in_window(parse_ics(&ics, &Utc, &window).unwrap(), &window);

        let summary: Vec<_> = events
            .iter()
            .map(|e| (e.id.as_str(), e.start, e.title.as_deref()))
            .collect();
        assert_eq!(
            summary,
            [
                ("standup@20261001T080000Z", utc(2026, 10, 1, 8, 0), Some("Standup")),
                ("standup@20261008T080000Z", utc(2026, 10, 8, 9, 30), Some("Standup (moved)")),
                ("standup@20261029T090000Z", utc(2026, 10, 29, 9, 0), Some("Standup")),
            ]
        );
        // The override inherits what it does not set.
        assert!(events[1].notes.is_some());
    }
}
