//! Frame timing.
//!
//! [`GameTimer`] measures the time between ticks and the total running time
//! while excluding the periods it was stopped (window minimized, unfocused).
//! [`FrameStats`] turns ticks into a once-per-second FPS report.

use std::time::Duration;

use instant::Instant;

#[derive(Debug, Clone)]
pub struct GameTimer {
    base: Instant,
    prev: Instant,
    stopped_at: Option<Instant>,
    paused: Duration,
    delta: f32,
}

impl Default for GameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            base: now,
            prev: now,
            stopped_at: None,
            paused: Duration::ZERO,
            delta: 0.0,
        }
    }

    /// Seconds between the last two ticks.
    pub fn delta_time(&self) -> f32 {
        self.delta
    }

    /// Seconds since [`reset`](Self::reset), not counting stopped time.
    pub fn total_time(&self) -> f32 {
        let end = self.stopped_at.unwrap_or(self.prev);
        end.duration_since(self.base)
            .saturating_sub(self.paused)
            .as_secs_f32()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped_at.is_some()
    }

    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.base = now;
        self.prev = now;
        self.stopped_at = None;
        self.paused = Duration::ZERO;
        self.delta = 0.0;
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        if let Some(stopped_at) = self.stopped_at.take() {
            self.paused += now.duration_since(stopped_at);
            self.prev = now;
        }
    }

    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    pub fn stop_at(&mut self, now: Instant) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(now);
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if self.stopped_at.is_some() {
            self.delta = 0.0;
            return;
        }
        // duration_since saturates, so the delta never goes negative even if
        // the clock misbehaves.
        self.delta = now.duration_since(self.prev).as_secs_f32();
        self.prev = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub fps: f32,
    pub ms_per_frame: f32,
}

impl FrameReport {
    /// Window caption in the form `"title    FPS: 60    Frame Time: 16.6667 (ms)"`.
    pub fn caption(&self, title: &str) -> String {
        format!(
            "{title}    FPS: {}    Frame Time: {} (ms)",
            self.fps,
            significant(self.ms_per_frame, 6)
        )
    }
}

/// `value` rounded to `digits` significant digits, trailing zeros dropped.
fn significant(value: f32, digits: i32) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Counts frames and produces a report once per second of timer time.
/// Frames rendered while the timer is stopped are not counted.
#[derive(Debug, Default, Clone)]
pub struct FrameStats {
    frame_count: u32,
    time_elapsed: f32,
}

impl FrameStats {
    pub fn frame(&mut self, timer: &GameTimer) -> Option<FrameReport> {
        if timer.is_stopped() {
            return None;
        }
        self.frame_count += 1;
        if timer.total_time() - self.time_elapsed < 1.0 {
            return None;
        }
        let fps = self.frame_count as f32;
        let report = FrameReport {
            fps,
            ms_per_frame: 1000.0 / fps,
        };
        self.frame_count = 0;
        self.time_elapsed += 1.0;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn tick_measures_delta_and_total() {
        let t0 = Instant::now();
        let mut timer = GameTimer::new();
        timer.reset_at(t0);
        timer.tick_at(t0 + ms(16));
        assert!((timer.delta_time() - 0.016).abs() < 1e-6);
        timer.tick_at(t0 + ms(50));
        assert!((timer.delta_time() - 0.034).abs() < 1e-6);
        assert!((timer.total_time() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn stopped_time_is_excluded() {
        let t0 = Instant::now();
        let mut timer = GameTimer::new();
        timer.reset_at(t0);
        timer.tick_at(t0 + ms(100));
        timer.stop_at(t0 + ms(100));
        timer.tick_at(t0 + ms(400));
        assert_eq!(timer.delta_time(), 0.0);
        assert!(timer.is_stopped());

        timer.start_at(t0 + ms(1100));
        timer.tick_at(t0 + ms(1200));
        assert!((timer.delta_time() - 0.1).abs() < 1e-6);
        assert!((timer.total_time() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn frame_stats_reports_once_per_second() {
        let t0 = Instant::now();
        let mut timer = GameTimer::new();
        timer.reset_at(t0);
        let mut stats = FrameStats::default();
        let mut reports = Vec::new();
        for i in 1..=100 {
            timer.tick_at(t0 + ms(20 * i));
            if let Some(report) = stats.frame(&timer) {
                reports.push(report);
            }
        }
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].fps, 50.0);
    }

    #[test]
    fn frames_while_stopped_are_not_counted() {
        let t0 = Instant::now();
        let mut timer = GameTimer::new();
        timer.reset_at(t0);
        let mut stats = FrameStats::default();
        let mut reports = Vec::new();
        for i in 1..=25 {
            timer.tick_at(t0 + ms(20 * i));
            reports.extend(stats.frame(&timer));
        }
        timer.stop_at(t0 + ms(500));
        for _ in 0..1000 {
            timer.tick_at(t0 + ms(600));
            reports.extend(stats.frame(&timer));
        }
        assert!(reports.is_empty());

        timer.start_at(t0 + ms(10_500));
        for i in 1..=25 {
            timer.tick_at(t0 + ms(10_500 + 20 * i));
            reports.extend(stats.frame(&timer));
        }
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].fps, 50.0);
        assert_eq!(reports[0].ms_per_frame, 20.0);
    }

    #[test]
    fn caption_prints_six_significant_digits() {
        let report = FrameReport {
            fps: 60.0,
            ms_per_frame: 1000.0 / 60.0,
        };
        assert_eq!(report.caption("terra"), "terra    FPS: 60    Frame Time: 16.6667 (ms)");
        assert_eq!(significant(1000.0, 6), "1000");
        assert_eq!(significant(0.123456789, 6), "0.123457");
    }
}
