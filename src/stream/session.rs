use crate::config::EngineParams;
use crate::stream::arrival::{estimate_distance, first_arrival};
use crate::stream::buffer::StreamBuffer;
use crate::stream::filter::{high_pass, low_pass};
use crate::stream::hub::BroadcastHub;
use crate::stream::integrate::{condition, cumtrapz};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Product of one processed batch, handed to the hub and to the caller,
/// never retained by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedFrame {
    pub raw_normalized: Vec<f64>,
    pub velocity: Vec<f64>,
    pub displacement: Vec<f64>,
    pub p_wave: Vec<f64>,
    pub s_wave: Vec<f64>,
    pub p_arrival: Option<usize>,
    pub s_arrival: Option<usize>,
    pub distance_km: Option<f64>,
}

/// One live estimation session: owns the batching buffer and fans
/// finished frames out through its hub.
///
/// Ingestion and processing run inline on the same call path, which keeps
/// the single-writer/single-drainer invariant on the buffer without a
/// lock. Moving processing onto a worker would require serializing
/// push/drain access again.
pub struct StreamSession {
    params: EngineParams,
    buffer: StreamBuffer,
    hub: Arc<BroadcastHub>,
}

impl StreamSession {
    pub fn new(params: EngineParams, hub: Arc<BroadcastHub>) -> Self {
        Self {
            buffer: StreamBuffer::new(params.capacity),
            params,
            hub,
        }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// Accept one accelerometer reading. Returns a frame only when this
    /// push completed a batch; the frame has already been broadcast.
    pub fn ingest_sample(&mut self, sample: f64) -> Option<ProcessedFrame> {
        self.buffer.push(sample);
        if !self.buffer.is_ready(self.params.threshold) {
            return None;
        }
        let batch = self.buffer.drain_and_reset();
        let frame = self.process_batch(&batch);
        self.hub.broadcast(&frame);
        Some(frame)
    }

    /// Batch pipeline: condition the raw window, integrate twice to
    /// velocity and displacement (re-conditioning between stages), split
    /// displacement into S/P branches, then locate arrivals and estimate
    /// distance.
    fn process_batch(&self, batch: &[f64]) -> ProcessedFrame {
        let dt = self.params.dt;

        let mut raw_normalized = batch.to_vec();
        condition(&mut raw_normalized);

        let mut velocity = cumtrapz(&raw_normalized, dt);
        condition(&mut velocity);

        let mut displacement = cumtrapz(&velocity, dt);
        condition(&mut displacement);

        let s_wave = low_pass(&displacement, self.params.alpha_low);
        let p_wave = high_pass(&displacement, self.params.alpha_high);

        let p_arrival = first_arrival(&p_wave, self.params.p_threshold);
        let s_arrival = first_arrival(&s_wave, self.params.s_threshold);
        let distance_km = estimate_distance(
            p_arrival,
            s_arrival,
            self.params.sample_rate(),
            self.params.vp,
            self.params.vs,
        );

        debug!(
            "Processed batch of {}: P {:?}, S {:?}, distance {:?}",
            batch.len(),
            p_arrival,
            s_arrival,
            distance_km
        );

        ProcessedFrame {
            raw_normalized,
            velocity,
            displacement,
            p_wave,
            s_wave,
            p_arrival,
            s_arrival,
            distance_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::arrival::{estimate_distance, first_arrival};

    fn test_params(threshold: usize) -> EngineParams {
        EngineParams {
            threshold,
            ..EngineParams::default()
        }
    }

    fn session(threshold: usize) -> StreamSession {
        StreamSession::new(test_params(threshold), Arc::new(BroadcastHub::new()))
    }

    #[test]
    fn test_batch_completes_exactly_at_threshold() {
        let mut session = session(20);
        let mut frames = 0;
        for i in 0..20 {
            let frame = session.ingest_sample((i as f64 * 0.37).sin());
            if i < 19 {
                assert!(frame.is_none(), "no frame before the threshold");
            } else {
                assert!(frame.is_some(), "frame on the threshold push");
                frames += 1;
            }
        }
        assert_eq!(frames, 1);
        assert!(session.buffer.is_empty(), "buffer resets after a batch");
    }

    #[test]
    fn test_frame_sequences_share_the_batch_length() {
        let mut session = session(50);
        let mut produced = None;
        for i in 0..50 {
            produced = session.ingest_sample((i as f64 * 0.11).cos());
        }
        let frame = produced.expect("50th push completes the batch");
        assert_eq!(frame.raw_normalized.len(), 50);
        assert_eq!(frame.velocity.len(), 50);
        assert_eq!(frame.displacement.len(), 50);
        assert_eq!(frame.p_wave.len(), 50);
        assert_eq!(frame.s_wave.len(), 50);
    }

    #[test]
    fn test_quiet_batch_has_no_arrivals() {
        let mut session = session(30);
        let mut produced = None;
        for _ in 0..30 {
            produced = session.ingest_sample(0.0);
        }
        let frame = produced.unwrap();
        assert_eq!(frame.p_arrival, None);
        assert_eq!(frame.s_arrival, None);
        assert_eq!(frame.distance_km, None);
        assert!(frame.displacement.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_arrivals_are_consistent_with_frame_traces() {
        let mut session = session(50);
        let mut produced = None;
        for i in 0..50 {
            // quiet onset then a burst, so the normalized traces carry a
            // clear crossing
            let s = if i < 15 { 0.0 } else { ((i - 15) as f64 * 0.9).sin() };
            produced = session.ingest_sample(s);
        }
        let frame = produced.unwrap();
        let params = test_params(50);
        assert_eq!(
            frame.p_arrival,
            first_arrival(&frame.p_wave, params.p_threshold)
        );
        assert_eq!(
            frame.s_arrival,
            first_arrival(&frame.s_wave, params.s_threshold)
        );
        assert_eq!(
            frame.distance_km,
            estimate_distance(
                frame.p_arrival,
                frame.s_arrival,
                params.sample_rate(),
                params.vp,
                params.vs
            )
        );
    }

    #[test]
    fn test_consecutive_batches_are_independent() {
        let mut session = session(10);
        let mut frames = Vec::new();
        for i in 0..30 {
            if let Some(frame) = session.ingest_sample(i as f64) {
                frames.push(frame);
            }
        }
        assert_eq!(frames.len(), 3, "three full batches from thirty pushes");
        for frame in &frames {
            assert_eq!(frame.raw_normalized.len(), 10);
        }
    }

    #[test]
    fn test_frames_reach_the_hub() {
        use crate::stream::hub::DisplaySink;
        use std::sync::Mutex;

        struct Recorder {
            frames: Mutex<usize>,
        }
        impl DisplaySink for Recorder {
            fn deliver(&self, _frame: &ProcessedFrame) -> anyhow::Result<()> {
                *self.frames.lock().unwrap() += 1;
                Ok(())
            }
        }

        let hub = Arc::new(BroadcastHub::new());
        let recorder = Arc::new(Recorder { frames: Mutex::new(0) });
        let sink: Arc<dyn DisplaySink> = recorder.clone();
        hub.connect(sink);

        let mut session = StreamSession::new(test_params(5), hub);
        for i in 0..10 {
            session.ingest_sample(i as f64 * 0.1);
        }
        assert_eq!(*recorder.frames.lock().unwrap(), 2);
    }
}
