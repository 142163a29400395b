use crate::config::EngineParams;
use crate::oscillator::SdofOscillator;
use crate::spectrum::{SpectralAnalyzer, SpectralResult};
use crate::synth::{self, NoiseSource};
use anyhow::{bail, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// One offline simulation call: magnitude on a Richter-like scale,
/// duration in seconds, dominant excitation frequency in Hz.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub magnitude: f64,
    pub duration: f64,
    pub frequency: f64,
}

impl SimulationRequest {
    pub fn validate(&self) -> Result<()> {
        if self.magnitude <= 0.0 {
            bail!("magnitude must be positive, got {}", self.magnitude);
        }
        if self.duration <= 0.0 {
            bail!("duration must be positive, got {}", self.duration);
        }
        if self.frequency <= 0.0 {
            bail!("frequency must be positive, got {}", self.frequency);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub time: Vec<f64>,
    pub waveform: Vec<f64>,
    pub frequency: Vec<f64>,
    pub spectrum: Vec<f64>,
}

impl SimulationResult {
    pub fn dominant_frequency(&self) -> Option<f64> {
        self.spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| self.frequency[i])
    }

    pub fn peak_displacement(&self) -> f64 {
        self.waveform.iter().fold(0.0f64, |m, &x| m.max(x.abs()))
    }
}

/// Offline pipeline: synthesize ground motion, drive the structural
/// oscillator, analyze the response spectrum.
///
/// Stateless per call; with a non-seeded noise source the same request
/// yields a different noise realization each time, which is intentional.
pub fn simulate(
    request: &SimulationRequest,
    params: &EngineParams,
    noise: &mut dyn NoiseSource,
) -> Result<SimulationResult> {
    request.validate()?;

    debug!(
        "Simulating magnitude={} duration={}s frequency={}Hz",
        request.magnitude, request.duration, request.frequency
    );

    let trace = synth::synthesize(request, params, noise);
    let oscillator = SdofOscillator::from_params(params);
    let waveform = oscillator.response(&trace.acceleration, params.dt);

    let analyzer = SpectralAnalyzer::new();
    let SpectralResult {
        frequency,
        magnitude: spectrum,
    } = analyzer.analyze(&waveform, params.dt);

    let result = SimulationResult {
        time: trace.time,
        waveform,
        frequency,
        spectrum,
    };

    info!(
        "Simulation complete: {} samples, peak displacement {:.3e}",
        result.time.len(),
        result.peak_displacement()
    );

    Ok(result)
}
