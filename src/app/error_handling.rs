//! Error handling utilities

use crate::error::CepDistError;
use tracing::error;

/// Exit code for an error that reached `main`
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<CepDistError>() {
        Some(err) => err.exit_code(),
        None => 1,
    }
}

/// Handle fatal errors and exit with appropriate status code
///
/// - `verbose = 0`: user-facing message only
/// - `verbose >= 1`: the full source chain as well
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    if let Some(err) = error.downcast_ref::<CepDistError>() {
        eprintln!("{}", err.user_message());
        if verbose >= 1 {
            eprintln!("\nContext Chain:\n{}", err.developer_message());
        }
    } else {
        eprintln!("Error: {error}");
        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }
    }

    std::process::exit(exit_code_for(&error))
}
