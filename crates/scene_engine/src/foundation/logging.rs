//! Logging utilities

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from the environment (`RUST_LOG`).
pub fn init() {
    env_logger::init();
}
