pub mod app;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod heatmap;
pub mod models;
pub mod rest;
pub mod session;
pub mod state;
pub mod suggestions;
pub mod tracker;
pub mod ui;
pub mod validation;
pub mod views;

pub use app::router;
pub use backend::{Backend, BackendError, HabitStore};
pub use config::Config;
pub use dashboard::Dashboard;
pub use rest::RestBackend;
pub use state::AppState;
