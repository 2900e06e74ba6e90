use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use datamover::app::{handle_fatal_error, init_logging, AppConfig};
use datamover::cluster::KubectlClient;
use datamover::config::{load_args, load_template_params, RunnerConfig};
use datamover::function::{ExecutionContext, FunctionRegistry};
use datamover::param::TemplateParams;
use datamover::subprocess::TokioProcessRunner;

/// Run data-movement functions as ephemeral Kubernetes jobs
#[derive(Parser)]
#[command(name = "datamover", version)]
#[command(about = "Seed and restore persistent volumes with short-lived jobs", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered functions and their arguments
    List,
    /// Check an argument file against a function's schema
    Validate {
        /// Function name, e.g. RestoreData
        function: String,

        /// YAML or JSON file with the function arguments
        #[arg(short, long)]
        args: PathBuf,
    },
    /// Run a function against the cluster
    Run {
        /// Function name, e.g. PrepareData
        function: String,

        /// YAML or JSON file with the function arguments
        #[arg(short, long)]
        args: PathBuf,

        /// YAML or JSON file with template params (topology, profile)
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// Path to runner configuration file
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let app_config = AppConfig::new(cli.verbose);
    init_logging(&app_config);

    let result = match cli.command {
        Commands::List => run_list(),
        Commands::Validate { function, args } => run_validate(&function, args),
        Commands::Run {
            function,
            args,
            params,
            config,
        } => run_function(&function, args, params, config).await,
    };

    if let Err(e) = result {
        handle_fatal_error(e, cli.verbose);
    }
}

fn run_list() -> Result<()> {
    let registry = FunctionRegistry::with_defaults()?;
    for name in registry.list() {
        let Some(function) = registry.get(&name) else {
            continue;
        };
        let descriptor = function.descriptor();
        println!("{name}: {}", function.description());
        println!(
            "  required: {}",
            descriptor.required.into_iter().collect::<Vec<_>>().join(", ")
        );
        if !descriptor.optional.is_empty() {
            println!(
                "  optional: {}",
                descriptor.optional.into_iter().collect::<Vec<_>>().join(", ")
            );
        }
    }
    Ok(())
}

fn run_validate(function: &str, args_path: PathBuf) -> Result<()> {
    let registry = FunctionRegistry::with_defaults()?;
    let args = load_args(&args_path)?;
    registry.validate(function, &args)?;
    println!("{function}: arguments are valid");
    Ok(())
}

async fn run_function(
    function: &str,
    args_path: PathBuf,
    params_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let registry = FunctionRegistry::with_defaults()?;
    let config = RunnerConfig::load(config_path.as_deref())?;
    let args = load_args(&args_path)?;
    let params = match params_path {
        Some(path) => load_template_params(&path)?,
        None => TemplateParams::default(),
    };
    debug!("Runner configuration: {:?}", config);

    let cluster = KubectlClient::new(Arc::new(TokioProcessRunner))
        .with_program(config.kubectl.clone())
        .with_poll_interval(config.poll_interval)
        .with_call_timeout(config.kubectl_timeout);

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            interrupt.cancel();
        }
    });

    let ctx = ExecutionContext::new(Arc::new(cluster))
        .with_cancellation(token)
        .with_config(config);

    registry
        .execute(function, &ctx, &params, &args)
        .await
        .with_context(|| format!("Failed to run {function}"))?;

    info!("{} completed", function);
    Ok(())
}
