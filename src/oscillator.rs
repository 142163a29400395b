use crate::config::EngineParams;

/// Central-difference gradient with one-sided differences at the ends.
/// Fewer than two samples have no defined slope and come back as zeros.
pub fn gradient(samples: &[f64], dt: f64) -> Vec<f64> {
    let n = samples.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut out = Vec::with_capacity(n);
    out.push((samples[1] - samples[0]) / dt);
    for i in 1..n - 1 {
        out.push((samples[i + 1] - samples[i - 1]) / (2.0 * dt));
    }
    out.push((samples[n - 1] - samples[n - 2]) / dt);
    out
}

/// Recover ground acceleration from a synthesized displacement-like trace
/// by double finite differencing.
///
/// Amplifies high-frequency content, so this stays a named seam: callers
/// that can synthesize acceleration directly should feed
/// [`SdofOscillator::response_to_acceleration`] instead.
pub fn ground_acceleration(trace: &[f64], dt: f64) -> Vec<f64> {
    gradient(&gradient(trace, dt), dt)
}

/// Single-degree-of-freedom mass-spring-damper excited at its base.
///
/// Integrated with explicit forward Euler, which is conditionally stable:
/// the reference constants (m=1, k=20, c=5 at dt=0.01) sit inside the
/// stable region and are deployment configuration, not per-call choices.
pub struct SdofOscillator {
    pub mass: f64,
    pub stiffness: f64,
    pub damping: f64,
}

impl SdofOscillator {
    pub fn new(mass: f64, stiffness: f64, damping: f64) -> Self {
        Self {
            mass,
            stiffness,
            damping,
        }
    }

    pub fn from_params(params: &EngineParams) -> Self {
        Self::new(params.mass, params.stiffness, params.damping)
    }

    /// Displacement response to a ground-motion trace. The trace is
    /// double-differentiated to obtain the forcing acceleration.
    pub fn response(&self, trace: &[f64], dt: f64) -> Vec<f64> {
        let forcing = ground_acceleration(trace, dt);
        self.response_to_acceleration(&forcing, dt)
    }

    /// Displacement response to an explicit ground-acceleration series,
    /// seeded at rest (x=0, v=0). Output length equals input length.
    pub fn response_to_acceleration(&self, ground_acc: &[f64], dt: f64) -> Vec<f64> {
        let mut x = 0.0;
        let mut v = 0.0;
        let mut recorded = Vec::with_capacity(ground_acc.len());
        for &a_g in ground_acc {
            let a = (-self.damping * v - self.stiffness * x - self.mass * a_g) / self.mass;
            v += a * dt;
            x += v * dt;
            recorded.push(x);
        }
        recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_of_linear_ramp() {
        let samples = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let grad = gradient(&samples, 1.0);
        for &g in &grad {
            assert!((g - 1.0).abs() < 1e-12, "linear ramp has unit slope, got {}", g);
        }
    }

    #[test]
    fn test_gradient_degenerate_input() {
        assert!(gradient(&[], 0.01).is_empty());
        assert_eq!(gradient(&[3.0], 0.01), vec![0.0]);
    }

    #[test]
    fn test_zero_forcing_stays_at_rest() {
        let oscillator = SdofOscillator::new(1.0, 20.0, 5.0);
        let response = oscillator.response(&vec![0.0; 300], 0.01);
        assert_eq!(response.len(), 300);
        assert!(response.iter().all(|&x| x == 0.0), "no drift without forcing");
    }

    #[test]
    fn test_response_length_matches_input() {
        let oscillator = SdofOscillator::new(1.0, 20.0, 5.0);
        let trace: Vec<f64> = (0..157).map(|i| (i as f64 * 0.1).sin()).collect();
        assert_eq!(oscillator.response(&trace, 0.01).len(), 157);
    }

    #[test]
    fn test_response_stays_bounded_for_sine_forcing() {
        let oscillator = SdofOscillator::new(1.0, 20.0, 5.0);
        let dt = 0.01;
        let trace: Vec<f64> = (0..2000)
            .map(|i| (2.0 * std::f64::consts::PI * 2.0 * i as f64 * dt).sin())
            .collect();
        let response = oscillator.response(&trace, dt);
        assert!(
            response.iter().all(|x| x.is_finite() && x.abs() < 100.0),
            "Euler integration must stay in the stable region"
        );
    }

    #[test]
    fn test_impulse_response_decays() {
        let oscillator = SdofOscillator::new(1.0, 20.0, 5.0);
        let mut forcing = vec![0.0; 1000];
        forcing[0] = 1.0;
        let response = oscillator.response_to_acceleration(&forcing, 0.01);
        let early_peak = response[..200].iter().fold(0.0f64, |m, &x| m.max(x.abs()));
        let late_peak = response[800..].iter().fold(0.0f64, |m, &x| m.max(x.abs()));
        assert!(early_peak > 0.0);
        assert!(late_peak < early_peak * 0.05, "damped oscillator must ring down");
    }
}
