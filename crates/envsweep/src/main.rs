mod commands;
mod prompt;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "envsweep")]
#[command(about = "Tear down every cloud resource of one environment, safely.", long_about = None)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover and delete the instances, volumes and floating IPs of an environment
    Teardown(TeardownArgs),
    /// Check provider authentication
    Auth {
        /// clouds.yaml entry (--os-cloud)
        #[arg(long, env = "ENVSWEEP_CLOUD")]
        cloud: Option<String>,
    },
    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct TeardownArgs {
    /// Environment filter (env_id), matched against instance names and IDs
    #[arg(env = "ENVSWEEP_FILTER", default_value = "")]
    pub filter: String,

    /// Treat the filter as a regular expression
    #[arg(long)]
    pub regex: bool,

    /// Discover and report only, delete nothing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Override every safety rule
    #[arg(long)]
    pub force: bool,

    /// Allow an empty filter (matches every identifier-shaped name)
    #[arg(long)]
    pub allow_empty_filter: bool,

    /// Allow a filter shorter than the minimum length
    #[arg(long)]
    pub allow_short_filter: bool,

    /// Do not fail when nothing matches
    #[arg(long)]
    pub allow_no_match: bool,

    /// Allow more instances than the maximum
    #[arg(long)]
    pub allow_many_instances: bool,

    /// Minimum filter length (default from config: 8)
    #[arg(long)]
    pub min_filter_length: Option<usize>,

    /// Maximum number of matched instances (default from config: 6)
    #[arg(long)]
    pub max_instances: Option<usize>,

    /// Deregister guests over ssh before deleting them
    #[arg(long)]
    pub deregister_guests: bool,

    /// clouds.yaml entry (--os-cloud)
    #[arg(long, env = "ENVSWEEP_CLOUD")]
    pub cloud: Option<String>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Version needs no config
    if matches!(cli.command, Commands::Version) {
        println!("envsweep {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let (settings, config_path) = envsweep_config::load()?;
    if let Some(path) = &config_path {
        tracing::info!("Loaded settings from {}", path.display());
    }

    match cli.command {
        Commands::Teardown(args) => commands::teardown::handle(args, settings).await,
        Commands::Auth { cloud } => commands::auth::handle(cloud, &settings).await,
        Commands::Version => Ok(()),
    }
}
