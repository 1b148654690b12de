use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use rateio::core::UnitType;
use rateio::core::config::AppConfig;
use rateio::core::log::{LogLevel, init_logging};
use rateio::{AppCommand, FractionCommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Calculate one unit's share of a total expense
    Calc {
        /// Unit type (APTO, LOJA or BOX)
        #[arg(short = 't', long = "type")]
        unit_type: Option<UnitType>,
        /// Unit number, e.g. 8 or 08
        #[arg(short, long)]
        location: String,
        /// Total expense, e.g. 12.500,00
        #[arg(long)]
        total: String,
    },
    /// Interactive calculator
    Interactive,
    /// Log in to the admin API
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged in user
    Whoami,
    /// Manage fraction records
    #[command(subcommand)]
    Fractions(FractionCommands),
}

#[derive(Subcommand)]
enum FractionCommands {
    /// List fractions, ten per page
    List {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show a single fraction
    Show { id: u64 },
    /// Register a new fraction
    Create {
        #[arg(short, long)]
        location: String,
        #[arg(short = 't', long = "type")]
        unit_type: String,
        #[arg(short, long)]
        fraction: String,
    },
    /// Change an existing fraction
    Update {
        id: u64,
        #[arg(short, long)]
        location: Option<String>,
        #[arg(short = 't', long = "type")]
        unit_type: Option<String>,
        #[arg(short, long)]
        fraction: Option<String>,
    },
    /// Delete a fraction
    Delete { id: u64 },
}

impl From<FractionCommands> for FractionCommand {
    fn from(cmd: FractionCommands) -> FractionCommand {
        match cmd {
            FractionCommands::List { page } => FractionCommand::List { page },
            FractionCommands::Show { id } => FractionCommand::Show { id },
            FractionCommands::Create {
                location,
                unit_type,
                fraction,
            } => FractionCommand::Create {
                location,
                unit_type,
                fraction,
            },
            FractionCommands::Update {
                id,
                location,
                unit_type,
                fraction,
            } => FractionCommand::Update {
                id,
                location,
                unit_type,
                fraction,
            },
            FractionCommands::Delete { id } => FractionCommand::Delete { id },
        }
    }
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Calc {
                unit_type,
                location,
                total,
            } => AppCommand::Calc {
                unit_type,
                location,
                total_amount: total,
            },
            Commands::Interactive => AppCommand::Interactive,
            Commands::Login { email, password } => AppCommand::Login { email, password },
            Commands::Logout => AppCommand::Logout,
            Commands::Whoami => AppCommand::Whoami,
            Commands::Fractions(cmd) => AppCommand::Fractions(cmd.into()),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

/// Reads `log_level` before logging is up. A missing or broken config is
/// reported later by the command itself.
fn configured_log_level(config_path: Option<&str>) -> LogLevel {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    };
    config.map(|c| c.log_level).unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, configured_log_level(cli.config_path.as_deref()));

    let result = match cli.command {
        Some(Commands::Setup) => rateio::cli::setup::setup(),
        Some(cmd) => rateio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
