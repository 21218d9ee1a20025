pub mod config;
pub mod error;
pub mod types;

pub use config::SignpostConfig;
pub use error::{Result, SignpostError};
pub use types::*;
