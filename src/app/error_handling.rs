//! Fatal error reporting for the binary

use tracing::error;

use crate::error::FunctionError;

/// Exit status for an error reaching `main`.
///
/// Function errors map by category; anything else (unreadable files, bad
/// configuration) is a usage error.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<FunctionError>() {
        Some(function_error) => function_error.exit_code(),
        None => 2,
    }
}

/// Print `error` and exit.
///
/// With `verbose >= 1` the whole source chain is printed.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {:#}", error);

    eprintln!("Error: {error}");
    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    } else if let Some(cause) = error.chain().last().filter(|_| error.chain().count() > 1) {
        eprintln!("Caused by: {cause}");
    }

    std::process::exit(exit_code_for(&error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_for_function_errors() {
        let err = anyhow::Error::new(FunctionError::missing_argument("image").in_function("PrepareData"));
        assert_eq!(exit_code_for(&err), 2);

        let err = anyhow::Error::new(FunctionError::Cancelled {
            job: "prepare-data-job-abcde".to_string(),
        });
        assert_eq!(exit_code_for(&err), 130);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let err = anyhow::anyhow!("Failed to read arguments file");
        assert_eq!(exit_code_for(&err), 2);
    }
}
