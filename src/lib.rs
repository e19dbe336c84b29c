pub mod actions;
pub mod clock;
pub mod codes;
pub mod config;
pub mod db;
pub mod error;
pub mod maintenance;
pub mod models;
#[cfg(feature = "grpc")]
pub mod proto;
pub mod qr;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
