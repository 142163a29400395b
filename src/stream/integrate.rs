/// Guard added to the peak before dividing so an all-zero batch
/// normalizes to zeros instead of NaNs.
const PEAK_EPSILON: f64 = 1e-6;

/// Cumulative trapezoidal integral, same length as the input with the
/// first element pinned to zero.
pub fn cumtrapz(samples: &[f64], dt: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(samples.len());
    let mut acc = 0.0;
    for (i, &s) in samples.iter().enumerate() {
        if i > 0 {
            acc += 0.5 * (s + samples[i - 1]) * dt;
        }
        out.push(acc);
    }
    out
}

/// Subtract the arithmetic mean in place. Double integration of noisy
/// accelerometer data drifts without this between stages.
pub fn detrend_mean(samples: &mut [f64]) {
    if samples.is_empty() {
        return;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    for s in samples.iter_mut() {
        *s -= mean;
    }
}

/// Scale in place so the peak absolute value is ~1.
pub fn normalize_peak(samples: &mut [f64]) {
    let peak = samples.iter().fold(0.0f64, |m, &s| m.max(s.abs()));
    let scale = peak + PEAK_EPSILON;
    for s in samples.iter_mut() {
        *s /= scale;
    }
}

/// detrend + normalize, the conditioning applied between every
/// integration stage of the batch pipeline.
pub fn condition(samples: &mut [f64]) {
    detrend_mean(samples);
    normalize_peak(samples);
}
