// src/timer.rs

use std::time::Instant;

/// Accumulating stopwatch for frame statistics. Wrap a region with
/// `start()`/`end(true)` each frame, then `print_report()` and
/// `reset_durations()` every reporting interval.
#[derive(Debug)]
pub struct FrameTimer {
    description: String,
    started_at: Option<Instant>,
    pub durations_us: Vec<u64>,
}

impl FrameTimer {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            started_at: None,
            durations_us: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Ends the current measurement and returns it in microseconds. Returns 0
    /// if `start()` was never called. `push` accumulates the duration for the
    /// next report.
    pub fn end(&mut self, push: bool) -> u64 {
        let Some(started_at) = self.started_at.take() else {
            return 0;
        };
        let duration_us = started_at.elapsed().as_micros() as u64;
        if push {
            self.durations_us.push(duration_us);
        }
        duration_us
    }

    pub fn reset_durations(&mut self) {
        self.durations_us.clear();
    }

    pub fn total(&self) -> u64 {
        self.durations_us.iter().sum()
    }

    pub fn avg(&self) -> u64 {
        if self.durations_us.is_empty() {
            0
        } else {
            self.total() / self.durations_us.len() as u64
        }
    }

    pub fn min(&self) -> u64 {
        self.durations_us.iter().copied().min().unwrap_or(0)
    }

    pub fn max(&self) -> u64 {
        self.durations_us.iter().copied().max().unwrap_or(0)
    }

    pub fn print_report(&self) {
        let (total, avg, min, max) = (self.total(), self.avg(), self.min(), self.max());
        log::info!(
            "{} over {} frames: total {:.3}ms, avg {}us, min {}us, max {}us",
            self.description,
            self.durations_us.len(),
            total as f64 / 1000.0,
            avg,
            min,
            max
        );
    }
}
