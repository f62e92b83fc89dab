//! Wall-clock aligned minute tick.
//!
//! The first tick fires immediately. Every later tick sleeps until the next
//! top of the minute as read from the [`Clock`] at that moment, so a wall
//! clock that jumped (laptop asleep, NTP step) is picked up on the next tick
//! and missed minutes are not replayed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};

/// Period of the detection/summary tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(60);

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time from `now` until the next `:00` second. A `now` exactly on the minute
/// waits a full minute.
pub fn until_next_minute(now: DateTime<Utc>) -> Duration {
    // nanosecond() exceeds 1e9 during a leap second.
    let nanos = u64::from(now.nanosecond() % 1_000_000_000);
    let into_minute = Duration::from_secs(u64::from(now.second())) + Duration::from_nanos(nanos);
    TICK_PERIOD.saturating_sub(into_minute)
}

/// Produces the minute ticks.
pub struct MinuteTicker {
    clock: Arc<dyn Clock>,
    fired_initial: bool,
}

impl MinuteTicker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            fired_initial: false,
        }
    }

    /// Waits for the next tick.
    pub async fn tick(&mut self) {
        if !self.fired_initial {
            self.fired_initial = true;
            return;
        }
        tokio::time::sleep(until_next_minute(self.clock.now())).await;
    }
}


#[cfg(test)]
mod tests {
    use super::manual::TokioClock;
    use super::*;
    use chrono::TimeZone;
    use tokio::time::Instant;

    #[test]
    fn alignment() {
        let at = |s: u32, ms: u32| {
            Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, s).unwrap()
                + chrono::Duration::milliseconds(i64::from(ms))
        };
        assert_eq!(until_next_minute(at(0, 0)), Duration::from_secs(60));
        assert_eq!(until_next_minute(at(30, 0)), Duration::from_secs(30));
        assert_eq!(until_next_minute(at(59, 500)), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_immediate_then_aligned() {
        let wall = Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 45).unwrap();
        let mut ticker = MinuteTicker::new(Arc::new(TokioClock::new(wall)));
        let started = Instant::now();

        ticker.tick().await;
        assert_eq!(started.elapsed(), Duration::ZERO);

        ticker.tick().await;
        assert_eq!(started.elapsed(), Duration::from_secs(15));

        ticker.tick().await;
        assert_eq!(started.elapsed(), Duration::from_secs(75));
    }

    #[tokio::test(start_paused = true)]
    async fn realigns_after_wall_clock_jump() {
        let wall = Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 45).unwrap();
        let clock = Arc::new(TokioClock::new(wall));
        let mut ticker = MinuteTicker::new(clock.clone());

        ticker.tick().await;
        ticker.tick().await;
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2026, 10, 16, 10, 1, 0).unwrap());

        // Suspended for 90.5 s: the wall clock moved, tokio's did not.
        clock.jump(chrono::Duration::milliseconds(90_500));
        ticker.tick().await;
        let now = clock.now();
        assert_eq!((now.second(), now.nanosecond()), (0, 0));
        assert_eq!(now, Utc.with_ymd_and_hms(2026, 10, 16, 10, 3, 0).unwrap());
    }
}
