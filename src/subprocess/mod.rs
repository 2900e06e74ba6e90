//! Subprocess abstraction used by the `kubectl` cluster client
//!
//! Production code runs real child processes through [`TokioProcessRunner`];
//! tests swap in [`MockProcessRunner`] to script command responses.

pub mod builder;
pub mod error;
pub mod mock;
pub mod runner;


pub use builder::ProcessCommandBuilder;
pub use error::ProcessError;
pub use mock::{MockCommandConfig, MockProcessRunner};
pub use runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner, TokioProcessRunner};
