pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::fractions::FractionChanges;
use crate::core::config::AppConfig;
use crate::core::form::FractionForm;
use crate::core::rateio::{CalculationInput, CalculatorState};
use crate::core::session::Session;
use crate::core::unit::UnitType;
use crate::providers::ApiClient;
use crate::store::KeyValueStore;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum FractionCommand {
    List {
        page: usize,
    },
    Show {
        id: u64,
    },
    Create {
        location: String,
        unit_type: String,
        fraction: String,
    },
    Update {
        id: u64,
        location: Option<String>,
        unit_type: Option<String>,
        fraction: Option<String>,
    },
    Delete {
        id: u64,
    },
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Calc {
        unit_type: Option<UnitType>,
        location: String,
        total_amount: String,
    },
    Interactive,
    Login {
        email: String,
        password: String,
    },
    Logout,
    Whoami,
    Fractions(FractionCommand),
}

/// Everything a command needs once the configuration is read.
struct AppContext {
    config: AppConfig,
    session: Session,
    client: ApiClient,
}

impl AppContext {
    fn load(config_path: Option<&str>) -> Result<Self> {
        let config = match config_path {
            Some(path) => AppConfig::load_from_path(path)?,
            None => AppConfig::load()?,
        };
        debug!("Loaded config: {config:#?}");

        let store = KeyValueStore::open(&config.data_path()?);
        let session = Session::new(store.get_collection("session"));
        let client = ApiClient::new(&config.api, session.clone())?;
        Ok(Self {
            config,
            session,
            client,
        })
    }
}

/// Runs a one-shot calculation and returns its outcome. The unit type falls
/// back to `calculator.default_type` from the configuration.
pub async fn run_calc(
    unit_type: Option<UnitType>,
    location: String,
    total_amount: String,
    config_path: Option<&str>,
) -> Result<CalculatorState> {
    let ctx = AppContext::load(config_path)?;
    calc_with(&ctx, unit_type, location, total_amount).await
}

async fn calc_with(
    ctx: &AppContext,
    unit_type: Option<UnitType>,
    location: String,
    total_amount: String,
) -> Result<CalculatorState> {
    let input = CalculationInput {
        unit_type: unit_type.unwrap_or(ctx.config.calculator.default_type),
        location,
        total_amount,
    };
    cli::calc::run(&ctx.client, &input).await
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Rateio starting...");

    let ctx = AppContext::load(config_path)?;

    match command {
        AppCommand::Calc {
            unit_type,
            location,
            total_amount,
        } => {
            calc_with(&ctx, unit_type, location, total_amount).await?;
            Ok(())
        }
        AppCommand::Interactive => {
            cli::calc::interactive(
                &ctx.client,
                &ctx.session,
                ctx.config.calculator.recalculation,
                ctx.config.calculator.default_type,
            )
            .await
        }
        AppCommand::Login { email, password } => {
            cli::session::login(&ctx.client, &email, &password).await
        }
        AppCommand::Logout => cli::session::logout(&ctx.session).await,
        AppCommand::Whoami => cli::session::whoami(&ctx.session).await,
        AppCommand::Fractions(command) => run_fraction_command(&ctx.client, command).await,
    }
}

async fn run_fraction_command(client: &ApiClient, command: FractionCommand) -> Result<()> {
    match command {
        FractionCommand::List { page } => cli::fractions::list(client, page).await,
        FractionCommand::Show { id } => cli::fractions::show(client, id).await,
        FractionCommand::Create {
            location,
            unit_type,
            fraction,
        } => {
            let form = FractionForm {
                location,
                unit_type,
                fraction,
            };
            cli::fractions::create(client, &form).await
        }
        FractionCommand::Update {
            id,
            location,
            unit_type,
            fraction,
        } => {
            let changes = FractionChanges {
                location,
                unit_type,
                fraction,
            };
            cli::fractions::update(client, id, changes).await
        }
        FractionCommand::Delete { id } => cli::fractions::delete(client, id).await,
    }
}
