mod home;
pub use home::Home;

mod nback;
pub use nback::NBack;

mod stroop;
pub use stroop::Stroop;

mod speed_match;
pub use speed_match::SpeedMatch;

mod results;
pub use results::Results;
