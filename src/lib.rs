pub mod app;
pub mod cli;
pub mod config;
pub mod feed;
pub mod highlight;
pub mod prefs;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use feed::{RecordStore, UpdateRecord};
pub use prefs::{PreferenceStore, ViewMode};
