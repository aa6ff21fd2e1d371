//! Chartwright CLI - turn deployment templates into deployable configuration

use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;

use error::CliError;

#[derive(Parser)]
#[command(name = "chartwright")]
#[command(author = "Chartwright Contributors")]
#[command(version)]
#[command(about = "Turn declarative multi-service templates into deployable configuration", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show template information
    Show {
        /// Template directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Show all information
        #[arg(long)]
        all: bool,
    },

    /// Render the nginx gateway configuration
    Gateway {
        /// Template directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the route plan as JSON instead of the configuration
        #[arg(long)]
        plan: bool,
    },

    /// Resolve a version against its template
    Resolve {
        /// Template directory
        path: PathBuf,

        /// Version name or id
        #[arg(value_name = "VERSION")]
        version_key: String,

        /// Output JSON instead of YAML
        #[arg(long)]
        json: bool,

        /// Overlay values on the resolved document (key=value)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Print a single value by dotted path
        #[arg(long)]
        get: Option<String>,
    },

    /// Validate a TLS certificate / private key pair
    Tls {
        /// PEM certificate file (may contain a chain)
        cert: PathBuf,

        /// PEM private key file
        key: PathBuf,

        /// Output the validation result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check template references and every version's TLS material
    Lint {
        /// Template directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Write the artifacts for a version to a directory
    Render {
        /// Template directory
        path: PathBuf,

        /// Version name or id
        #[arg(value_name = "VERSION")]
        version_key: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Write artifacts even if the version is not deployable
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_env("CHARTWRIGHT_LOG").unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("chartwright=debug,chartwright_core=debug,chartwright_engine=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Show { path, all } => commands::show::run(&path, all),

        Commands::Gateway { path, output, plan } => {
            commands::gateway::run(&path, output.as_deref(), plan)
        }

        Commands::Resolve {
            path,
            version_key,
            json,
            set,
            get,
        } => commands::resolve::run(&path, &version_key, json, &set, get.as_deref()),

        Commands::Tls { cert, key, json } => commands::tls::run(&cert, &key, json),

        Commands::Lint { path, strict } => commands::lint::run(&path, strict),

        Commands::Render {
            path,
            version_key,
            output,
            force,
        } => commands::render::run(&path, &version_key, &output, force),
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(report) = run(cli) {
        let code = report
            .downcast_ref::<CliError>()
            .map(CliError::exit_code)
            .unwrap_or(exit_codes::ERROR);
        eprintln!("{:?}", report);
        std::process::exit(code);
    }
}
