pub mod arrival;
pub mod buffer;
pub mod filter;
pub mod hub;
pub mod integrate;
pub mod session;

pub use buffer::StreamBuffer;
pub use hub::{BroadcastHub, DisplaySink, SessionId};
pub use session::{ProcessedFrame, StreamSession};
