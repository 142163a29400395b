use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Seismic ground-motion simulator and streaming arrival estimator.")]
pub struct Cli {
    /// Path to a KDL engine config overriding the deployment defaults.
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synthesize a ground-motion event and analyze the structural response.
    Simulate {
        /// Event magnitude on a Richter-like scale.
        #[arg(short, long)]
        magnitude: f64,
        /// Event duration in seconds.
        #[arg(short, long)]
        duration: f64,
        /// Dominant excitation frequency in Hz.
        #[arg(short, long)]
        frequency: f64,
        /// Seed the noise source for a reproducible trace.
        #[arg(long)]
        seed: Option<u64>,
        /// Write the full result to a binary file.
        #[arg(long)]
        out: Option<String>,
    },
    /// Replay a recorded sample file through the streaming estimator.
    Stream {
        /// Whitespace-separated acceleration samples.
        input: String,
        /// Pace ingestion at the configured sampling interval.
        #[arg(long)]
        realtime: bool,
    },
}
