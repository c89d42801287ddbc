pub mod app;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pwa;
pub mod services;
pub mod state;
pub mod storage;
pub mod types;

pub use app::app;
pub use state::AppState;
