//! Logging is verified by hand; `bin/logger_demo.rs` shows the bootstrap
//! filter being replaced at runtime.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
