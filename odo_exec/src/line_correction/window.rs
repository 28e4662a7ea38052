//! Moving sum filter over the most recent reflectance samples

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of samples held in the window.
pub const WINDOW_LEN: usize = 5;

/// Gain applied to a single sample while the window is filling.
pub const COLD_START_GAIN: f64 = 5000.0;

/// Gain applied to the window sum once it is full.
pub const STEADY_STATE_GAIN: f64 = 1000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The last [`WINDOW_LEN`] samples and their sum.
#[derive(Debug, Clone, Default)]
pub struct IntensityWindow {
    samples: VecDeque<f64>,
    sum: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IntensityWindow {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(WINDOW_LEN),
            sum: 0.0,
        }
    }

    /// Add a sample and return the decision metric.
    ///
    /// While the window held fewer than [`WINDOW_LEN`] samples before this one, the metric is
    /// the new sample times [`COLD_START_GAIN`]. Once it is full, the oldest sample is evicted
    /// and the metric is the window sum times [`STEADY_STATE_GAIN`].
    pub fn push(&mut self, sample: f64) -> f64 {
        if self.samples.len() < WINDOW_LEN {
            self.samples.push_back(sample);
            self.sum += sample;

            sample * COLD_START_GAIN
        } else {
            if let Some(oldest) = self.samples.pop_front() {
                self.sum -= oldest;
            }
            self.samples.push_back(sample);
            self.sum += sample;

            self.sum * STEADY_STATE_GAIN
        }
    }

    /// Running sum of the held samples.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Number of held samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == WINDOW_LEN
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_cold_start_then_steady_state() {
        let values = [0.5, 0.4, 0.3, 0.2, 0.1, 0.6, 0.7];
        let mut window = IntensityWindow::new();
        assert!(window.is_empty());

        // Filling: single sample metric
        for (i, &v) in values[..WINDOW_LEN].iter().enumerate() {
            let metric = window.push(v);
            assert!(approx(metric, v * 5000.0), "sample {}: {}", i, metric);
            assert_eq!(window.len(), i + 1);
        }
        assert!(window.is_full());
        assert!(approx(window.sum(), 1.5));

        // 0.5 is evicted
        let metric = window.push(values[5]);
        assert!(approx(window.sum(), 0.4 + 0.3 + 0.2 + 0.1 + 0.6));
        assert!(approx(metric, 1.6 * 1000.0));
        assert_eq!(window.len(), WINDOW_LEN);

        // Then 0.4
        let metric = window.push(values[6]);
        assert!(approx(window.sum(), 0.3 + 0.2 + 0.1 + 0.6 + 0.7));
        assert!(approx(metric, 1.9 * 1000.0));
        assert_eq!(window.len(), WINDOW_LEN);
    }

    #[test]
    fn test_sum_tracks_contents() {
        let mut window = IntensityWindow::new();

        for i in 0..100 {
            window.push((i % 7) as f64 * 0.1);

            let expected: f64 = window.samples.iter().sum();
            assert!(approx(window.sum(), expected));
        }
    }
}
