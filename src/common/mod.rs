//! Common utilities shared by the environment, features and suite runner

pub mod config;
pub mod error;
pub mod flags;
pub mod logging;

pub use config::Config;
pub use error::{Error, Result};
