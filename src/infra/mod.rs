mod config;
mod logging;

pub use config::*;
pub use logging::*;
