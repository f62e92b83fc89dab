//! Recurrence expansion for VEVENTs carrying RRULE, RDATE or EXDATE.
//!
//! RRULEs are expanded by the `rrule` crate from the series' DTSTART. RDATE,
//! EXDATE and RECURRENCE-ID values are read here so that floating and all-day
//! series resolve them in the same zone as their DTSTART.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz as NamedTz;
use icalendar::{CalendarDateTime, DatePerhapsTime};
use rrule::RRuleSet;
use tracing::warn;

use headsup_core::TimeWindow;

use super::parse::{naive_in, to_utc};

/// Upper bound on occurrences produced per series and query.
const MAX_OCCURRENCES: u16 = 500;

const DATE_TIME: &str = "%Y%m%dT%H%M%S";

/// Recurrence properties of one VEVENT, kept as unfolded content lines.
#[derive(Debug, Default, Clone)]
pub(super) struct Recurrence {
    rules: Vec<String>,
    rdates: Vec<String>,
    exdates: Vec<String>,
    recurrence_id: Option<String>,
}

impl Recurrence {
    /// Collects the recurrence lines of every VEVENT in `ics`, in document order.
    pub(super) fn scan(ics: &str) -> Vec<Self> {
        let unfolded = icalendar::parser::unfold(ics);
        let mut found = Vec::new();
        let mut current: Option<Self> = None;
        // Depth of sub-components (VALARM) inside the current VEVENT.
        let mut nested = 0usize;

        for line in unfolded.lines() {
            let line = line.trim_end();
            let name = line
                .split([';', ':'])
                .next()
                .unwrap_or_default()
                .to_ascii_uppercase();
            let value = line.split_once(':').map_or("", |(_, v)| v.trim());

            let Some(rec) = current.as_mut() else {
                if name == "BEGIN" && value.eq_ignore_ascii_case("VEVENT") {
                    current = Some(Self::default());
                }
                continue;
            };
            match name.as_str() {
                "BEGIN" => nested += 1,
                "END" if nested > 0 => nested -= 1,
                "END" => found.extend(current.take()),
                _ if nested > 0 => {}
                "RRULE" => rec.rules.push(line.to_string()),
                "RDATE" => rec.rdates.push(line.to_string()),
                "EXDATE" => rec.exdates.push(line.to_string()),
                "RECURRENCE-ID" => rec.recurrence_id = Some(line.to_string()),
                _ => {}
            }
        }
        found
    }

    /// Whether the VEVENT defines a series rather than a single instance.
    pub(super) fn is_series(&self) -> bool {
        !self.rules.is_empty() || !self.rdates.is_empty()
    }

    /// Original start of the instance an override VEVENT replaces.
    pub(super) fn recurrence_id<Tz: TimeZone>(&self, local: &Tz) -> Option<DateTime<Utc>> {
        instants(self.recurrence_id.as_deref()?, local)
            .into_iter()
            .next()
    }

    /// Starts of the occurrences that may overlap `window`, sorted.
    ///
    /// `first` is `dtstart` resolved to UTC and `length` the duration of each
    /// occurrence. A rule that cannot be expanded leaves only `first`.
    pub(super) fn starts<Tz: TimeZone>(
        &self,
        dtstart: &DatePerhapsTime,
        first: DateTime<Utc>,
        length: Duration,
        local: &Tz,
        window: &TimeWindow,
    ) -> Vec<DateTime<Utc>> {
        // Slack for occurrences already running at the window start and for
        // floating wall times expanded as UTC.
        let from = window.start - length - Duration::days(1);
        let until = window.end + Duration::days(1);

        let mut starts = if self.rules.is_empty() {
            vec![first]
        } else {
            self.expand_rules(dtstart, local, from, until)
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Cannot expand RRULE, keeping first occurrence");
                    vec![first]
                })
        };
        starts.extend(self.rdates.iter().flat_map(|line| instants(line, local)));

        let excluded: Vec<_> = self
            .exdates
            .iter()
            .flat_map(|line| instants(line, local))
            .collect();
        starts.retain(|start| !excluded.contains(start) && (from..until).contains(start));
        starts.sort();
        starts.dedup();
        starts
    }

    fn expand_rules<Tz: TimeZone>(
        &self,
        dtstart: &DatePerhapsTime,
        local: &Tz,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, rrule::RRuleError> {
        let (anchor, floating) = anchor_line(dtstart);
        let text = std::iter::once(anchor)
            .chain(self.rules.iter().cloned())
            .collect::<Vec<_>>()
            .join("\n");

        let set = text
            .parse::<RRuleSet>()?
            .after(from.with_timezone(&rrule::Tz::UTC))
            .before(until.with_timezone(&rrule::Tz::UTC));
        let result = set.all(MAX_OCCURRENCES);
        if result.limited {
            warn!(limit = MAX_OCCURRENCES, "Recurrence truncated");
        }

        Ok(result
            .dates
            .into_iter()
            .filter_map(|dt| {
                if floating {
                    naive_in(&dt.naive_utc(), local)
                } else {
                    Some(dt.with_timezone(&Utc))
                }
            })
            .collect())
    }
}

/// Id of one occurrence of the series `uid`.
pub(super) fn instance_id(uid: &str, start: DateTime<Utc>) -> String {
    format!("{uid}@{}Z", start.format(DATE_TIME))
}

/// The DTSTART line handed to rrule, and whether its results are wall times
/// to read in the local zone.
///
/// Floating times and dates are expanded as if they were UTC so that a
/// daylight-saving change cannot move them off their wall-clock time.
fn anchor_line(dtstart: &DatePerhapsTime) -> (String, bool) {
    match dtstart {
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => {
            (format!("DTSTART:{}Z", dt.format(DATE_TIME)), false)
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid })
            if tzid.parse::<NamedTz>().is_ok() =>
        {
            (
                format!("DTSTART;TZID={tzid}:{}", date_time.format(DATE_TIME)),
                false,
            )
        }
        DatePerhapsTime::DateTime(
            CalendarDateTime::WithTimezone { date_time, .. } | CalendarDateTime::Floating(date_time),
        ) => (format!("DTSTART:{}Z", date_time.format(DATE_TIME)), true),
        DatePerhapsTime::Date(date) => (format!("DTSTART:{}T000000Z", date.format("%Y%m%d")), true),
    }
}

/// Reads the values of a date-list line (RDATE, EXDATE, RECURRENCE-ID).
/// PERIOD values are ignored.
fn instants<Tz: TimeZone>(line: &str, local: &Tz) -> Vec<DateTime<Utc>> {
    let Some((head, values)) = line.split_once(':') else {
        return Vec::new();
    };
    let tzid = head
        .split(';')
        .skip(1)
        .find_map(|param| param.strip_prefix("TZID="))
        .map(|tzid| tzid.trim_matches('"'));

    values
        .split(',')
        .filter_map(|value| {
            let value = value.trim();
            let parsed = if let Some(utc) = value.strip_suffix('Z') {
                let naive = NaiveDateTime::parse_from_str(utc, DATE_TIME).ok()?;
                DatePerhapsTime::DateTime(CalendarDateTime::Utc(naive.and_utc()))
            } else if value.len() == 8 {
                DatePerhapsTime::Date(NaiveDate::parse_from_str(value, "%Y%m%d").ok()?)
            } else {
                let date_time = NaiveDateTime::parse_from_str(value, DATE_TIME).ok()?;
                DatePerhapsTime::DateTime(match tzid {
                    Some(tzid) => CalendarDateTime::WithTimezone {
                        date_time,
                        tzid: tzid.to_string(),
                    },
                    None => CalendarDateTime::Floating(date_time),
                })
            };
            to_utc(parsed, local)
        })
        .collect()
}
