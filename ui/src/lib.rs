//! Shared UI crate for Brainplay: game engines, metrics, storage and the
//! Dioxus views used by the web and desktop shells.

pub mod core;
pub mod i18n;
pub mod results;
pub mod tasks;
pub mod views;

pub mod components {
    pub mod app_navbar;
    pub use app_navbar::register_nav;
    pub use app_navbar::AppNavbar;
    pub use app_navbar::NavBuilder;

    mod settings_panel;
    pub use settings_panel::SettingsPanel;
}
