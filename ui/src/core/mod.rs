//! Platform-agnostic building blocks shared by every task.

pub mod analytics;
pub mod format;
pub mod platform;
pub mod settings;
pub mod storage;
pub mod timing;
