//! Time-throttled progress statistics and display refreshes.

use std::time::{Duration, Instant};

/// Period of the progress statistics line.
pub const STATS_PERIOD: Duration = Duration::from_secs(1);

/// Fires at most once per `period`.
#[derive(Debug, Clone)]
pub struct Throttle {
    period: Duration,
    last: Instant,
}

impl Throttle {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self { period, last: now }
    }

    /// If more than `period` has passed since the last firing, restart the
    /// window at `now` and return the time elapsed.
    pub fn fire(&mut self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.last);
        if elapsed > self.period {
            self.last = now;
            Some(elapsed)
        } else {
            None
        }
    }
}

/// Where the render loop currently is. All fields are zero-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub channel: usize,
    pub row: u32,
    pub column: u32,
}

/// Progress bookkeeping for one render.
#[derive(Debug)]
pub struct ProgressReporter {
    channels: usize,
    width: u32,
    height: u32,
    stats: Throttle,
    display: Option<Throttle>,
    window_rays: u64,
    total_rays: u64,
}

impl ProgressReporter {
    /// `display_interval` of `None` disables display refresh scheduling.
    pub fn new(channels: usize, width: u32, height: u32, display_interval: Option<Duration>, now: Instant) -> Self {
        Self {
            channels,
            width,
            height,
            stats: Throttle::new(STATS_PERIOD, now),
            display: display_interval.map(|period| Throttle::new(period, now)),
            window_rays: 0,
            total_rays: 0,
        }
    }

    pub fn record_rays(&mut self, rays: u64) {
        self.window_rays += rays;
        self.total_rays += rays;
    }

    pub fn total_rays(&self) -> u64 {
        self.total_rays
    }

    /// Work units finished once the pixel at `at` is done.
    fn completed(&self, at: Position) -> u64 {
        let per_channel = u64::from(self.width) * u64::from(self.height);
        at.channel as u64 * per_channel + u64::from(at.row) * u64::from(self.width) + u64::from(at.column) + 1
    }

    pub fn work_units(&self) -> u64 {
        self.channels as u64 * u64::from(self.width) * u64::from(self.height)
    }

    /// The progress line, if the statistics window has closed.
    pub fn poll_stats(&mut self, at: Position, now: Instant) -> Option<String> {
        let elapsed = self.stats.fire(now)?;
        let rate = self.window_rays as f64 / elapsed.as_secs_f64() / 1000.0;
        self.window_rays = 0;

        let percent = 100.0 * self.completed(at) as f64 / self.work_units() as f64;
        Some(format!(
            "{:.2}% complete (channel {}/{}, line {}/{}, pixel {}/{}, {:.1}k rays/s)",
            percent,
            at.channel + 1,
            self.channels,
            at.row + 1,
            self.height,
            at.column + 1,
            self.width,
            rate
        ))
    }

    /// Whether the display should be refreshed now.
    pub fn display_due(&mut self, now: Instant) -> bool {
        self.display.as_mut().is_some_and(|throttle| throttle.fire(now).is_some())
    }
}
