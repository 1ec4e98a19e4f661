pub mod app;
pub mod calendar;
pub mod celebration;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod habits;
pub mod handlers;
pub mod models;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::Storage;
pub use tracker::Tracker;
