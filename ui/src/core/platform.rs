//! Platform detection helpers and task spawning glue.

use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Web,
    Desktop,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_arch = "wasm32") {
            Self::Web
        } else {
            Self::Desktop
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Desktop => "desktop",
        }
    }
}

/// Short platform label persisted alongside every session.
pub fn platform_string() -> String {
    let base = Platform::current().as_str();
    if cfg!(target_arch = "wasm32") {
        base.to_string()
    } else {
        format!("{base}-{}", std::env::consts::OS)
    }
}

/// Spawn a timer future on the Dioxus runtime of the calling component.
pub fn spawn_future<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    dioxus::prelude::spawn(future);
}
