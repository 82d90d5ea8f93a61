pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod notifications;
pub mod reminder;
pub mod schedule;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{load_state, save_state};
