pub mod params;
pub mod pattern;
pub mod queue;
pub mod render;
pub mod scheduler;
pub mod tracker;
pub mod transport;

pub use params::{LiveParams, ParamKind};
pub use pattern::PatternMatrix;
pub use queue::NoteQueue;
pub use render::{EngineRenderer, VoiceRenderer};
pub use scheduler::LookaheadScheduler;
pub use tracker::PositionTracker;
pub use transport::{AssetState, Transport};
