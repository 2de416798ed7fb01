pub mod settings;

pub use settings::{SettingsUpdate, TrackerSettings};
