pub mod config;
pub mod error;
pub mod export;
pub mod middleware;
pub mod state;
pub mod store;

pub use config::{Config, StudioConfig};
pub use error::AppError;
pub use state::{get_app_state, AppState};
