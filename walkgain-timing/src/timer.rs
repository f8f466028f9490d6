use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Clock driving the tick loop.
pub trait Timer: Clone {
    type Timestamp: Copy + Clone;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn sleep(&mut self, d: Duration);
    fn record_tick(&mut self, d: Duration);
    fn tick_stats(&self) -> TickStats;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    pub samples: usize,
    pub average_tick_ns: f64,
    pub jitter_ns: f64,
    pub min_tick_ns: f64,
    pub max_tick_ns: f64,
    pub effective_hz: f64,
}

impl TickStats {
    fn from_durations<'a>(durations: impl Iterator<Item = &'a Duration>) -> Self {
        let times: Vec<f64> = durations.map(|d| d.as_nanos() as f64).collect();
        if times.is_empty() {
            return Self::default();
        }
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            samples: times.len(),
            average_tick_ns: avg,
            jitter_ns: var.sqrt(),
            min_tick_ns: min,
            max_tick_ns: max,
            effective_hz: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone)]
struct TickWindow {
    ticks: VecDeque<Duration>,
    max_samples: usize,
}

impl TickWindow {
    fn new(max_samples: usize) -> Self {
        Self {
            ticks: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    fn push(&mut self, d: Duration) {
        if self.ticks.len() >= self.max_samples {
            self.ticks.pop_front();
        }
        self.ticks.push_back(d);
    }

    fn stats(&self) -> TickStats {
        TickStats::from_durations(self.ticks.iter())
    }
}

/// Monotonic wall clock with a precise sleep on Linux.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    start: Instant,
    window: TickWindow,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&mut self, d: Duration) {
        self.high_precision_sleep(d)
    }
    fn record_tick(&mut self, d: Duration) {
        self.window.push(d);
    }
    fn tick_stats(&self) -> TickStats {
        self.window.stats()
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            window: TickWindow::new(1000),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC};

        let req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };

        unsafe {
            clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated clock: `sleep` advances time instantly, so runs are reproducible.
#[derive(Debug, Clone)]
pub struct ManualTimer {
    now_ns: u64,
    window: TickWindow,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self {
            now_ns: 0,
            window: TickWindow::new(1000),
        }
    }

    pub fn advance(&mut self, d: Duration) {
        self.now_ns = self.now_ns.saturating_add(d.as_nanos() as u64);
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now_ns.saturating_sub(ts))
    }
    fn sleep(&mut self, d: Duration) {
        self.advance(d);
    }
    fn record_tick(&mut self, d: Duration) {
        self.window.push(d);
    }
    fn tick_stats(&self) -> TickStats {
        self.window.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_sleep_advances_clock() {
        let mut timer = ManualTimer::new();
        let start = timer.now();
        timer.sleep(Duration::from_millis(11));
        assert_eq!(timer.elapsed(start), Duration::from_millis(11));
    }

    #[test]
    fn stats_over_uniform_ticks() {
        let mut timer = ManualTimer::new();
        for _ in 0..10 {
            timer.record_tick(Duration::from_millis(10));
        }
        let stats = timer.tick_stats();
        assert_eq!(stats.samples, 10);
        assert_eq!(stats.jitter_ns, 0.0);
        assert!((stats.effective_hz - 100.0).abs() < 1e-9);
        assert_eq!(stats.min_tick_ns, stats.max_tick_ns);
    }

    #[test]
    fn window_keeps_most_recent_samples() {
        let mut window = TickWindow::new(3);
        for ms in [100, 1, 1, 1] {
            window.push(Duration::from_millis(ms));
        }
        assert_eq!(window.stats().max_tick_ns, 1_000_000.0);
    }

    #[test]
    fn empty_stats_are_zero() {
        assert_eq!(HighPrecisionTimer::new().tick_stats(), TickStats::default());
    }

    #[test]
    fn wall_clock_is_monotonic() {
        let mut timer = HighPrecisionTimer::new();
        let a = timer.now();
        timer.sleep(Duration::from_millis(1));
        assert!(timer.now() >= a + 1_000_000);
    }
}
