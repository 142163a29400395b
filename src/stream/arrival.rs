/// Index of the first sample whose absolute value exceeds the threshold.
///
/// First crossing wins with no debouncing, so a single noisy spike can
/// register as an arrival; the thresholds are tuned against the
/// normalized traces to keep that rare.
pub fn first_arrival(signal: &[f64], threshold: f64) -> Option<usize> {
    signal.iter().position(|&x| x.abs() > threshold)
}

/// Epicentral distance from the P/S arrival delay.
///
/// Fails soft: missing either arrival, or an S arrival that does not
/// strictly follow the P arrival, yields `None` rather than an error.
pub fn estimate_distance(
    p_arrival: Option<usize>,
    s_arrival: Option<usize>,
    sample_rate: f64,
    vp: f64,
    vs: f64,
) -> Option<f64> {
    let p = p_arrival?;
    let s = s_arrival?;
    if s <= p {
        return None;
    }
    let slowness_gap = 1.0 / vs - 1.0 / vp;
    if slowness_gap <= 0.0 {
        return None;
    }
    let delta_t = (s - p) as f64 / sample_rate;
    Some(delta_t / slowness_gap)
}
