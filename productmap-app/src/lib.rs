pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

mod app_context;
mod config;

pub use app_context::AppContext;
pub use config::{AppConfig, DEFAULT_BIND_ADDR, DEFAULT_GEOCODER_BASE_URL};
