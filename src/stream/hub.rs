use crate::stream::session::ProcessedFrame;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub type SessionId = u64;

/// Receiver of processed frames, typically a display transport owned by
/// the surrounding service layer.
pub trait DisplaySink: Send + Sync {
    fn deliver(&self, frame: &ProcessedFrame) -> anyhow::Result<()>;
}

/// Fan-out point for processed frames.
///
/// The subscriber set is snapshotted before delivery so a disconnect
/// during a broadcast never invalidates the iteration, and one failing
/// sink never blocks the rest.
#[derive(Default)]
pub struct BroadcastHub {
    sinks: Mutex<HashMap<SessionId, Arc<dyn DisplaySink>>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, sink: Arc<dyn DisplaySink>) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sinks.lock().unwrap().insert(id, sink);
        debug!("Display session {} connected", id);
        id
    }

    pub fn disconnect(&self, id: SessionId) -> bool {
        let removed = self.sinks.lock().unwrap().remove(&id).is_some();
        if removed {
            debug!("Display session {} disconnected", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.sinks.lock().unwrap().len()
    }

    pub fn broadcast(&self, frame: &ProcessedFrame) {
        let snapshot: Vec<(SessionId, Arc<dyn DisplaySink>)> = {
            let sinks = self.sinks.lock().unwrap();
            sinks.iter().map(|(&id, sink)| (id, Arc::clone(sink))).collect()
        };
        for (id, sink) in snapshot {
            if let Err(e) = sink.deliver(frame) {
                warn!("Dropping frame for display session {}: {}", id, e);
            }
        }
    }
}

/// Sink that reports each frame through the process log, used by the CLI
/// replay path.
pub struct LogSink;

impl DisplaySink for LogSink {
    fn deliver(&self, frame: &ProcessedFrame) -> anyhow::Result<()> {
        match frame.distance_km {
            Some(distance) => log::info!(
                "Frame: {} samples, P at {:?}, S at {:?}, source ~{:.1} km",
                frame.raw_normalized.len(),
                frame.p_arrival,
                frame.s_arrival,
                distance
            ),
            None => log::info!(
                "Frame: {} samples, no usable P/S separation",
                frame.raw_normalized.len()
            ),
        }
        Ok(())
    }
}
