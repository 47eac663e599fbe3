pub mod engine;
pub mod metrics;
mod view;

pub use engine::{
    InkColor, RandomStroopSequencer, StroopAnswer, StroopConfig, StroopEngine, StroopResponse,
    StroopSequencer, StroopStats, StroopTrial,
};
pub use metrics::StroopMetrics;
pub use view::StroopView;
