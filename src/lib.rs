pub mod api;
pub mod auth;
pub mod bridge;
pub mod config;
pub mod error;
pub mod livekit;
pub mod models;
pub mod redis;
pub mod state;
pub mod ws;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
