//! Logger setup plus conditional logging macros that check a module-level
//! `ENABLE_LOGS` flag.
//!
//! Usage:
//! ```ignore
//! // In your module, define the flag first:
//! const ENABLE_LOGS: bool = true;
//!
//! // Then use the macros (they're exported at the crate root):
//! use crate::{log_info, log_warn};
//!
//! log_info!("This will log if ENABLE_LOGS is true");
//! ```

use log::LevelFilter;

/// Installs `env_logger` at `Info` (`Debug` when `debug` is set).
/// `RUST_LOG` still overrides per-module levels. Safe to call more than once.
pub fn init(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Macro for conditional debug logging.
/// Checks the `ENABLE_LOGS` const in the calling module.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// Macro for conditional info logging.
/// Checks the `ENABLE_LOGS` const in the calling module.
///
/// Each module that uses this macro must define:
/// ```ignore
/// const ENABLE_LOGS: bool = true; // or false
/// ```
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Macro for conditional warn logging.
/// Checks the `ENABLE_LOGS` const in the calling module.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
