#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod config;
pub mod feed;
pub mod item;
pub mod launcher;
pub mod logging;
pub mod model;
pub mod render;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
