pub mod engine;
pub mod metrics;
mod view;

pub use engine::{
    RandomSetSequencer, SetSequencer, SpeedMatchAnswer, SpeedMatchConfig, SpeedMatchEngine,
    SpeedMatchSet, SpeedMatchStats,
};
pub use metrics::SpeedMatchMetrics;
pub use view::SpeedMatchView;
