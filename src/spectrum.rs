use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// One-sided magnitude spectrum. `frequency` and `magnitude` are parallel,
/// equal-length, with frequencies strictly increasing and strictly positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralResult {
    pub frequency: Vec<f64>,
    pub magnitude: Vec<f64>,
}

impl SpectralResult {
    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Frequency of the bin with the largest magnitude.
    pub fn dominant_frequency(&self) -> Option<f64> {
        self.magnitude
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| self.frequency[i])
    }
}

pub struct SpectralAnalyzer {
    planner: Mutex<FftPlanner<f64>>,
}

impl SpectralAnalyzer {
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
        }
    }

    /// Forward DFT of a real series, keeping only the strictly positive
    /// frequency bins. A series of one or zero samples has no positive
    /// bins and yields empty sequences.
    pub fn analyze(&self, samples: &[f64], dt: f64) -> SpectralResult {
        let n = samples.len();
        if n <= 1 {
            return SpectralResult {
                frequency: Vec::new(),
                magnitude: Vec::new(),
            };
        }

        let fft = {
            let mut planner = self.planner.lock().unwrap();
            planner.plan_fft_forward(n)
        };
        let mut buffer: Vec<Complex<f64>> =
            samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.process(&mut buffer);

        // Bins k = 1 .. ceil(n/2) - 1 carry the positive frequencies; bin 0
        // is DC and the upper half mirrors into negative frequencies.
        let positive = (n + 1) / 2;
        let mut frequency = Vec::with_capacity(positive.saturating_sub(1));
        let mut magnitude = Vec::with_capacity(positive.saturating_sub(1));
        for (k, value) in buffer.iter().enumerate().take(positive).skip(1) {
            frequency.push(k as f64 / (n as f64 * dt));
            magnitude.push(value.norm());
        }

        SpectralResult {
            frequency,
            magnitude,
        }
    }
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_series_is_empty() {
        let analyzer = SpectralAnalyzer::new();
        assert!(analyzer.analyze(&[], 0.01).is_empty());
        assert!(analyzer.analyze(&[1.0], 0.01).is_empty());
    }

    #[test]
    fn test_parallel_sequences_and_monotonic_frequencies() {
        let analyzer = SpectralAnalyzer::new();
        let samples: Vec<f64> = (0..128).map(|i| (i as f64 * 0.3).sin()).collect();
        let result = analyzer.analyze(&samples, 0.01);
        assert_eq!(result.frequency.len(), result.magnitude.len());
        assert!(!result.is_empty());
        assert!(result.frequency[0] > 0.0);
        for pair in result.frequency.windows(2) {
            assert!(pair[0] < pair[1], "frequencies must be strictly increasing");
        }
        assert!(result.magnitude.iter().all(|&m| m >= 0.0));
    }

    #[test]
    fn test_bin_count_excludes_dc_and_mirror() {
        let analyzer = SpectralAnalyzer::new();
        // even length: n/2 - 1 positive bins
        let result = analyzer.analyze(&vec![1.0; 500], 0.01);
        assert_eq!(result.frequency.len(), 249);
        // odd length: (n - 1) / 2 positive bins
        let result = analyzer.analyze(&vec![1.0; 5], 0.01);
        assert_eq!(result.frequency.len(), 2);
    }

    #[test]
    fn test_pure_tone_dominates_its_bin() {
        let analyzer = SpectralAnalyzer::new();
        let dt = 0.01;
        let samples: Vec<f64> = (0..500)
            .map(|i| (2.0 * std::f64::consts::PI * 2.0 * i as f64 * dt).sin())
            .collect();
        let result = analyzer.analyze(&samples, dt);
        let dominant = result.dominant_frequency().unwrap();
        assert!(
            (dominant - 2.0).abs() < 1e-9,
            "2 Hz tone must peak at the 2 Hz bin, got {}",
            dominant
        );
    }

    #[test]
    fn test_dc_offset_does_not_leak_into_spectrum() {
        let analyzer = SpectralAnalyzer::new();
        let dt = 0.01;
        let samples: Vec<f64> = (0..500)
            .map(|i| 5.0 + (2.0 * std::f64::consts::PI * 3.0 * i as f64 * dt).sin())
            .collect();
        let result = analyzer.analyze(&samples, dt);
        // DC sits in the discarded zero bin, the tone remains dominant
        let dominant = result.dominant_frequency().unwrap();
        assert!((dominant - 3.0).abs() < 1e-9);
    }
}
