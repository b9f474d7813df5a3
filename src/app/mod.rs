//! Application module
//!
//! - Configuration handling
//! - Logging setup
//! - Runtime initialization and collaborator wiring

pub mod config;
pub mod error_handling;
pub mod logging;
pub mod runtime;

pub use config::AppConfig;
pub use error_handling::handle_fatal_error;
pub use logging::init_logging;
pub use runtime::{build_workflow, initialize_app};
