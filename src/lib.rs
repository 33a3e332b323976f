pub mod config;
pub mod console;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod playback;
pub mod schedule;
pub mod session;
pub mod surface;

pub use config::Config;
pub use console::ConsoleSurface;
pub use error::{GatewayError, GatewayResult};
pub use feed::{FeedConfig, FeedMonitor, FeedSnapshot, FeedTransport, HttpFeedTransport};
pub use gateway::{
    Artifact, ArtifactSequence, HttpGateway, ServiceHealth, SessionService, SpeechConversion,
    StopSummary,
};
pub use playback::{PlaybackConfig, PlaybackScheduler};
pub use schedule::{PollHandle, PollSlot};
pub use session::{CommandOutcome, SessionConfig, SessionController, SessionState, SessionStats};
pub use surface::{DisplaySurface, FeedStatusKind, NoticeLevel, Notifier, Progress};
