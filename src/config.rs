use knuffel::Decode;
use serde::{Deserialize, Serialize};

/// Resolved deployment constants consumed by the numeric pipeline.
///
/// Every stage takes these by reference instead of reaching for globals, so
/// independent sessions can run with different tunings in one process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineParams {
    /// Sampling interval in seconds.
    pub dt: f64,
    /// Maximum number of samples retained by the stream buffer.
    pub capacity: usize,
    /// Batch size that triggers a drain of the stream buffer.
    pub threshold: usize,
    /// Low-pass coefficient for the S-wave branch.
    pub alpha_low: f64,
    /// High-pass coefficient for the P-wave branch.
    pub alpha_high: f64,
    /// Amplitude threshold for P-wave onset on the normalized trace.
    pub p_threshold: f64,
    /// Amplitude threshold for S-wave onset on the normalized trace.
    pub s_threshold: f64,
    /// P-wave propagation speed, km/s.
    pub vp: f64,
    /// S-wave propagation speed, km/s.
    pub vs: f64,
    /// Oscillator mass.
    pub mass: f64,
    /// Oscillator stiffness.
    pub stiffness: f64,
    /// Oscillator damping.
    pub damping: f64,
    /// Noise standard deviation as a fraction of the amplitude scale.
    pub noise_ratio: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            dt: 0.01,
            capacity: 500,
            threshold: 50,
            alpha_low: 0.03,
            alpha_high: 0.25,
            p_threshold: 0.1,
            s_threshold: 0.1,
            vp: 6.0,
            vs: 3.5,
            mass: 1.0,
            stiffness: 20.0,
            damping: 5.0,
            noise_ratio: 0.03,
        }
    }
}

impl EngineParams {
    pub fn sample_rate(&self) -> f64 {
        1.0 / self.dt
    }
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[knuffel(child)]
    pub sampling: Option<SamplingConfig>,
    #[knuffel(child)]
    pub stream: Option<StreamConfig>,
    #[knuffel(child)]
    pub oscillator: Option<OscillatorConfig>,
    #[knuffel(child)]
    pub waves: Option<WaveConfig>,
}

#[derive(Decode, Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[knuffel(property)]
    pub dt: Option<f64>,
}

#[derive(Decode, Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    #[knuffel(property)]
    pub capacity: Option<usize>,
    #[knuffel(property)]
    pub threshold: Option<usize>,
    #[knuffel(property(name = "alpha-low"))]
    pub alpha_low: Option<f64>,
    #[knuffel(property(name = "alpha-high"))]
    pub alpha_high: Option<f64>,
    #[knuffel(property(name = "p-threshold"))]
    pub p_threshold: Option<f64>,
    #[knuffel(property(name = "s-threshold"))]
    pub s_threshold: Option<f64>,
}

#[derive(Decode, Debug, Clone, Serialize, Deserialize)]
pub struct OscillatorConfig {
    #[knuffel(property)]
    pub mass: Option<f64>,
    #[knuffel(property)]
    pub stiffness: Option<f64>,
    #[knuffel(property)]
    pub damping: Option<f64>,
}

#[derive(Decode, Debug, Clone, Serialize, Deserialize)]
pub struct WaveConfig {
    #[knuffel(property)]
    pub vp: Option<f64>,
    #[knuffel(property)]
    pub vs: Option<f64>,
    #[knuffel(property(name = "noise-ratio"))]
    pub noise_ratio: Option<f64>,
}

impl EngineConfig {
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = knuffel::parse("engine.kdl", &content)?;
        Ok(config)
    }

    /// Merge the file contents over the built-in defaults.
    pub fn params(&self) -> EngineParams {
        let mut params = EngineParams::default();
        if let Some(sampling) = &self.sampling {
            if let Some(dt) = sampling.dt {
                params.dt = dt;
            }
        }
        if let Some(stream) = &self.stream {
            if let Some(capacity) = stream.capacity {
                params.capacity = capacity;
            }
            if let Some(threshold) = stream.threshold {
                params.threshold = threshold;
            }
            if let Some(alpha_low) = stream.alpha_low {
                params.alpha_low = alpha_low;
            }
            if let Some(alpha_high) = stream.alpha_high {
                params.alpha_high = alpha_high;
            }
            if let Some(p_threshold) = stream.p_threshold {
                params.p_threshold = p_threshold;
            }
            if let Some(s_threshold) = stream.s_threshold {
                params.s_threshold = s_threshold;
            }
        }
        if let Some(oscillator) = &self.oscillator {
            if let Some(mass) = oscillator.mass {
                params.mass = mass;
            }
            if let Some(stiffness) = oscillator.stiffness {
                params.stiffness = stiffness;
            }
            if let Some(damping) = oscillator.damping {
                params.damping = damping;
            }
        }
        if let Some(waves) = &self.waves {
            if let Some(vp) = waves.vp {
                params.vp = vp;
            }
            if let Some(vs) = waves.vs {
                params.vs = vs;
            }
            if let Some(noise_ratio) = waves.noise_ratio {
                params.noise_ratio = noise_ratio;
            }
        }
        params
    }
}
