pub mod app_config;
pub mod keys;

pub use app_config::{AppConfig, ComposeConfig};
