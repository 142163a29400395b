use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use seismo::args::{Cli, Commands};
use seismo::config::{EngineConfig, EngineParams};
use seismo::simulate::{self, SimulationRequest};
use seismo::stream::hub::LogSink;
use seismo::stream::{BroadcastHub, StreamSession};
use seismo::synth::{GaussianNoise, NoiseSource};
use std::io::Write;
use std::process;
use std::sync::Arc;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let params = load_params(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate {
            magnitude,
            duration,
            frequency,
            seed,
            out,
        } => {
            let request = SimulationRequest {
                magnitude,
                duration,
                frequency,
            };
            let mut noise: Box<dyn NoiseSource> = match seed {
                Some(seed) => Box::new(GaussianNoise::seeded(seed)),
                None => Box::new(GaussianNoise::new()),
            };
            let result = simulate::simulate(&request, &params, noise.as_mut())?;

            println!(
                "{} samples over {:.2}s, peak displacement {:.3e}",
                result.time.len(),
                duration,
                result.peak_displacement()
            );
            if let Some(dominant) = result.dominant_frequency() {
                println!("dominant response frequency: {:.2} Hz", dominant);
            }

            if let Some(path) = out {
                let bin = bincode::serialize(&result)?;
                let mut file = std::fs::File::create(&path)
                    .with_context(|| format!("Failed to create {}", path))?;
                file.write_all(&bin)
                    .with_context(|| format!("Failed to write result to {}", path))?;
                println!("result written to {}", path);
            }
        }
        Commands::Stream { input, realtime } => {
            let samples = load_samples(&input)?;
            log::info!("Replaying {} samples from {}", samples.len(), input);

            let hub = Arc::new(BroadcastHub::new());
            hub.connect(Arc::new(LogSink));
            let mut session = StreamSession::new(params, hub);

            let frames = if realtime {
                let runtime = tokio::runtime::Runtime::new()
                    .context("Failed to start the replay runtime")?;
                runtime.block_on(replay_realtime(&mut session, &samples))
            } else {
                replay(&mut session, &samples)
            };
            println!("{} frames from {} samples", frames, samples.len());
        }
    }

    Ok(())
}

fn load_params(path: Option<&str>) -> Result<EngineParams> {
    if let Some(path) = path {
        let config = EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path))?;
        return Ok(config.params());
    }
    if let Some(proj_dirs) = ProjectDirs::from("com", "seismo", "seismo") {
        let default_path = proj_dirs.config_dir().join("engine.kdl");
        if default_path.exists() {
            log::debug!("Loading config from {}", default_path.display());
            let config = EngineConfig::load(&default_path)?;
            return Ok(config.params());
        }
    }
    Ok(EngineParams::default())
}

fn load_samples(path: &str) -> Result<Vec<f64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read samples from {}", path))?;
    content
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .with_context(|| format!("Invalid sample value '{}'", token))
        })
        .collect()
}

fn replay(session: &mut StreamSession, samples: &[f64]) -> usize {
    let mut frames = 0;
    for &sample in samples {
        if let Some(frame) = session.ingest_sample(sample) {
            frames += 1;
            report_frame(frames, &frame);
        }
    }
    frames
}

async fn replay_realtime(session: &mut StreamSession, samples: &[f64]) -> usize {
    let dt = session.params().dt;
    let mut interval = tokio::time::interval(std::time::Duration::from_secs_f64(dt));
    let mut frames = 0;
    for &sample in samples {
        interval.tick().await;
        if let Some(frame) = session.ingest_sample(sample) {
            frames += 1;
            report_frame(frames, &frame);
        }
    }
    frames
}

fn report_frame(index: usize, frame: &seismo::stream::ProcessedFrame) {
    match frame.distance_km {
        Some(distance) => println!("frame {}: estimated distance {:.1} km", index, distance),
        None => println!("frame {}: distance unavailable", index),
    }
}
