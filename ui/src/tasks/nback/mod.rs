pub mod engine;
pub mod metrics;
mod view;

pub use engine::{
    ChannelTally, MatchChannel, NBackConfig, NBackEngine, NBackSequencer, NBackStats,
    RandomNBackSequencer, RoundRecord, RoundReview, SubmitOutcome,
};
pub use metrics::{ChannelMetrics, NBackMetrics};
pub use view::NBackView;
