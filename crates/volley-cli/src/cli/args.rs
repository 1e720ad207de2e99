use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "volley",
    version,
    about = "Weighted-random load-test driver for the disbursement GraphQL API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the load test: fetch a token, fire iterations, write the report
    Run(RunArgs),
    /// Parse and validate the config without sending any traffic
    Validate(ValidateArgs),
    /// Print the effective weighted scenario table
    Scenarios(ScenariosArgs),
    Version,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    #[arg(long, default_value = "loadtest.yaml")]
    pub config: PathBuf,

    /// Total iterations across all virtual users (overrides config)
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Number of virtual users (overrides config)
    #[arg(long)]
    pub vus: Option<usize>,

    /// Seed for reproducible scenario draws (overrides config)
    #[arg(long, env = "VOLLEY_SEED")]
    pub seed: Option<u64>,

    /// Request timeout in milliseconds (overrides config)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    #[arg(long, default_value = "load-report.json")]
    pub out: PathBuf,

    /// Include per-iteration rows in the report
    #[arg(long)]
    pub detail: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from("loadtest.yaml"),
            iterations: None,
            vus: None,
            seed: None,
            timeout_ms: None,
            out: PathBuf::from("load-report.json"),
            detail: false,
        }
    }
}

#[derive(Parser, Clone)]
pub struct ValidateArgs {
    #[arg(long, default_value = "loadtest.yaml")]
    pub config: PathBuf,
}

#[derive(Parser, Clone)]
pub struct ScenariosArgs {
    #[arg(long, default_value = "loadtest.yaml")]
    pub config: PathBuf,
}
