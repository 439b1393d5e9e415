// crates/trimpress-core/src/helpers/clock.rs
//
// Wall-clock helpers with the current Instant passed in by the caller, so the
// transport logic is deterministic under test.
//
//   PlaybackClock — media position that advances only while running.
//   Ticker        — fixed-interval gate for the range-enforcement tick.

use std::time::{Duration, Instant};

/// Interval of the range-enforcement tick.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Debug, Default)]
pub struct PlaybackClock {
    /// Position accumulated up to the last play/pause/seek edge.
    base_ms: u64,
    /// Set while running: the instant the current run started.
    started: Option<Instant>,
    /// Upper bound (media duration). `None` until the duration is known.
    limit_ms: Option<u64>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    pub fn set_limit(&mut self, limit_ms: Option<u64>) {
        self.limit_ms = limit_ms;
        if let Some(limit) = limit_ms {
            self.base_ms = self.base_ms.min(limit);
        }
    }

    pub fn position_ms(&self, now: Instant) -> u64 {
        let elapsed = self.started
            .map(|t| now.saturating_duration_since(t).as_millis() as u64)
            .unwrap_or(0);
        let pos = self.base_ms.saturating_add(elapsed);
        match self.limit_ms {
            Some(limit) => pos.min(limit),
            None        => pos,
        }
    }

    /// True once a running clock has hit its limit.
    pub fn at_end(&self, now: Instant) -> bool {
        match self.limit_ms {
            Some(limit) => self.position_ms(now) >= limit,
            None        => false,
        }
    }

    pub fn play(&mut self, now: Instant) {
        if self.started.is_none() {
            self.started = Some(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        self.base_ms = self.position_ms(now);
        self.started = None;
    }

    pub fn seek(&mut self, position_ms: u64, now: Instant) {
        self.base_ms = match self.limit_ms {
            Some(limit) => position_ms.min(limit),
            None        => position_ms,
        };
        if self.started.is_some() {
            self.started = Some(now);
        }
    }
}

/// Gate that opens at most once per `interval`.
#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    last:     Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// Returns `true` (and re-arms) when the interval has elapsed since the
    /// last time it returned `true`. The first call always fires.
    pub fn due(&mut self, now: Instant) -> bool {
        let fire = self.last
            .map(|last| now.saturating_duration_since(last) >= self.interval)
            .unwrap_or(true);
        if fire {
            self.last = Some(now);
        }
        fire
    }

    /// Time until the next tick, used to schedule a repaint.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.last
            .map(|last| self.interval.saturating_sub(now.saturating_duration_since(last)))
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_only_advances_while_running() {
        let t0 = Instant::now();
        let mut c = PlaybackClock::new();
        assert_eq!(c.position_ms(t0 + Duration::from_secs(5)), 0);
        c.play(t0);
        assert_eq!(c.position_ms(t0 + Duration::from_millis(1500)), 1500);
        c.pause(t0 + Duration::from_millis(1500));
        assert_eq!(c.position_ms(t0 + Duration::from_secs(9)), 1500);
    }

    #[test]
    fn clock_caps_at_limit() {
        let t0 = Instant::now();
        let mut c = PlaybackClock::new();
        c.set_limit(Some(2_000));
        c.seek(1_500, t0);
        c.play(t0);
        let later = t0 + Duration::from_secs(3);
        assert_eq!(c.position_ms(later), 2_000);
        assert!(c.at_end(later));
    }

    #[test]
    fn seek_while_running_restarts_run() {
        let t0 = Instant::now();
        let mut c = PlaybackClock::new();
        c.play(t0);
        let t1 = t0 + Duration::from_secs(4);
        c.seek(500, t1);
        assert_eq!(c.position_ms(t1 + Duration::from_millis(250)), 750);
    }

    #[test]
    fn ticker_fires_once_per_interval() {
        let t0 = Instant::now();
        let mut t = Ticker::new(Duration::from_millis(100));
        assert!(t.due(t0));
        assert!(!t.due(t0 + Duration::from_millis(40)));
        assert_eq!(t.remaining(t0 + Duration::from_millis(40)), Duration::from_millis(60));
        assert!(t.due(t0 + Duration::from_millis(100)));
        assert!(!t.due(t0 + Duration::from_millis(150)));
    }
}
