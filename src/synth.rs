use crate::config::EngineParams;
use crate::simulate::SimulationRequest;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of additive sample noise for the synthesizer.
///
/// Production uses [`GaussianNoise`]; tests inject [`NoNoise`] to make the
/// synthesized trace deterministic.
pub trait NoiseSource {
    fn sample(&mut self, std_dev: f64) -> f64;
}

pub struct GaussianNoise {
    rng: StdRng,
}

impl GaussianNoise {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for GaussianNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseSource for GaussianNoise {
    fn sample(&mut self, std_dev: f64) -> f64 {
        // Box-Muller over two uniform draws
        let u1 = self.rng.gen::<f64>().max(1e-12);
        let u2 = self.rng.gen::<f64>();
        std_dev * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn sample(&mut self, _std_dev: f64) -> f64 {
        0.0
    }
}

/// Synthetic ground-motion record sampled at a fixed interval.
#[derive(Debug, Clone)]
pub struct GroundMotionTrace {
    pub time: Vec<f64>,
    pub acceleration: Vec<f64>,
}

/// Richter-style magnitude to amplitude mapping: energy grows as
/// 10^(1.5 M), amplitude as its square root.
pub fn amplitude_scale(magnitude: f64) -> f64 {
    10f64.powf(1.5 * magnitude).sqrt() / 1e5
}

/// Build a trace as three decaying sinusoid packets: a fast P wave from
/// t=0, a stronger S wave lagged by 1 s and a slow surface wave lagged by
/// 2 s, plus Gaussian instrument noise.
pub fn synthesize(
    request: &SimulationRequest,
    params: &EngineParams,
    noise: &mut dyn NoiseSource,
) -> GroundMotionTrace {
    let dt = params.dt;
    let n = (request.duration / dt).ceil() as usize;
    let amp = amplitude_scale(request.magnitude);
    let f = request.frequency;
    let two_pi = 2.0 * std::f64::consts::PI;

    let mut time = Vec::with_capacity(n);
    let mut acceleration = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f64 * dt;
        let mut a = 0.3 * amp * (-0.15 * t).exp() * (two_pi * 2.0 * f * t).sin();
        if t >= 1.0 {
            a += 0.6 * amp * (-0.1 * (t - 1.0)).exp() * (two_pi * f * (t - 1.0)).sin();
        }
        if t >= 2.0 {
            a += amp * (-0.05 * (t - 2.0)).exp() * (two_pi * 0.5 * f * (t - 2.0)).sin();
        }
        a += noise.sample(params.noise_ratio * amp);
        time.push(t);
        acceleration.push(a);
    }

    GroundMotionTrace { time, acceleration }
}
