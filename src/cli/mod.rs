pub mod commands;
pub mod config;
pub mod logging;
pub mod run;

pub use commands::*;
