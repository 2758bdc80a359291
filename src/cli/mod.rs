pub mod holdings;
pub mod language;
pub mod prices;
pub mod setup;
pub mod summary;
pub mod ui;
pub mod watch;
