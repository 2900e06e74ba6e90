//! # datamover
//!
//! Runs data-movement functions (seed a volume, restore a backup) as
//! short-lived Kubernetes jobs and waits for them to finish.
//!
//! ## Usage
//!
//! ```bash
//! datamover run RestoreData --args args.yaml --params params.yaml
//! ```
//!
//! ## Modules
//!
//! - `function` - Named functions, argument bags and the function registry
//! - `job` - Create / wait / always-delete engine for ephemeral jobs
//! - `param` - Template params: workload topology and location profile
//! - `location` - Restore pipeline construction
//! - `cluster` - Cluster client contract, `kubectl` client and in-memory mock
//! - `subprocess` - Subprocess abstraction used by the `kubectl` client
//! - `config` - Runner configuration and input file loading
//! - `error` - Error taxonomy shared by all functions
//! - `app` - Logging and fatal error handling for the binary
pub mod app;
pub mod cluster;
pub mod config;
pub mod error;
pub mod function;
pub mod job;
pub mod location;
pub mod param;
pub mod subprocess;

pub use error::FunctionError;
pub use function::{ExecutionContext, FunctionRegistry};
