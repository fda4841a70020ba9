//! Per-tick timing for the frame pump.
//!
//! Rolling window of detector and engine latencies with percentile stats,
//! plus a count of ticks that blew the frame budget.

use std::collections::VecDeque;

/// One video frame at 60 Hz.
pub const DEFAULT_BUDGET_MS: f64 = 16.7;

/// Rolling tick timing over a window of samples.
#[derive(Debug)]
pub struct FrameTiming {
    /// Time spent in the landmark source.
    pub detect_times: VecDeque<f64>,
    /// Time spent in the engine.
    pub process_times: VecDeque<f64>,
    /// Maximum number of samples to keep.
    pub window_size: usize,
    /// Total ticks recorded.
    pub total_frames: u64,
    /// Ticks whose detect + process time exceeded the budget.
    pub missed_frames: u64,
    /// Frame budget in milliseconds.
    pub budget_ms: f64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(600, DEFAULT_BUDGET_MS)
    }
}

impl FrameTiming {
    pub fn new(window_size: usize, budget_ms: f64) -> Self {
        let window_size = window_size.max(1);
        Self {
            detect_times: VecDeque::with_capacity(window_size),
            process_times: VecDeque::with_capacity(window_size),
            window_size,
            total_frames: 0,
            missed_frames: 0,
            budget_ms,
        }
    }

    pub fn record(&mut self, detect_ms: f64, process_ms: f64) {
        Self::push_sample(&mut self.detect_times, detect_ms, self.window_size);
        Self::push_sample(&mut self.process_times, process_ms, self.window_size);

        self.total_frames += 1;
        if detect_ms + process_ms > self.budget_ms {
            self.missed_frames += 1;
        }
    }

    fn push_sample(samples: &mut VecDeque<f64>, value: f64, window_size: usize) {
        samples.push_back(value);
        while samples.len() > window_size {
            samples.pop_front();
        }
    }

    fn sorted(samples: &VecDeque<f64>) -> Vec<f64> {
        let mut v: Vec<f64> = samples.iter().copied().collect();
        v.sort_by(|a, b| a.total_cmp(b));
        v
    }

    /// Nearest-rank percentile of a sorted slice.
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    pub fn stats(&self) -> FrameTimingStats {
        let detect = Self::sorted(&self.detect_times);
        let process = Self::sorted(&self.process_times);
        let total: Vec<f64> = {
            let mut t: Vec<f64> = self
                .detect_times
                .iter()
                .zip(self.process_times.iter())
                .map(|(d, p)| d + p)
                .collect();
            t.sort_by(|a, b| a.total_cmp(b));
            t
        };

        FrameTimingStats {
            detect_p50: Self::percentile(&detect, 50.0),
            process_p50: Self::percentile(&process, 50.0),
            process_p99: Self::percentile(&process, 99.0),
            total_p50: Self::percentile(&total, 50.0),
            total_p95: Self::percentile(&total, 95.0),
            total_p99: Self::percentile(&total, 99.0),
            missed_pct: if self.total_frames > 0 {
                (self.missed_frames as f64 / self.total_frames as f64) * 100.0
            } else {
                0.0
            },
            total_frames: self.total_frames,
            missed_frames: self.missed_frames,
        }
    }

    /// Format stats as an s-expression.
    pub fn stats_sexp(&self) -> String {
        let s = self.stats();
        format!(
            "(:detect-p50 {:.2} :process-p50 {:.3} :process-p99 {:.3} :total-p50 {:.2} :total-p95 {:.2} :total-p99 {:.2} :missed-pct {:.1} :total-frames {} :missed-frames {})",
            s.detect_p50, s.process_p50, s.process_p99, s.total_p50, s.total_p95,
            s.total_p99, s.missed_pct, s.total_frames, s.missed_frames,
        )
    }
}

/// Computed tick timing statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTimingStats {
    pub detect_p50: f64,
    pub process_p50: f64,
    pub process_p99: f64,
    pub total_p50: f64,
    pub total_p95: f64,
    pub total_p99: f64,
    pub missed_pct: f64,
    pub total_frames: u64,
    pub missed_frames: u64,
}
