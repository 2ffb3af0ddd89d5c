//! Utility modules for fault tolerance and resilience

pub mod env;
pub mod error;
pub mod logging;
pub mod signal;

// Re-export commonly used items
pub use env::{env_bool, env_int, env_opt, env_or_default, env_or_else};
pub use error::{
    err_option_to_result, log_error, log_error_async, result_to_option, with_default,
    with_default_async, with_fallback, with_fallback_async,
};
pub use logging::{init_logging, init_logging_from_config};
pub use signal::{create_shutdown_receiver, wait_for_shutdown_signal};
