pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod notify;
pub mod retry;
pub mod service;
pub mod wallpaper;

pub use error::{Error, Result};
