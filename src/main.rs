use std::process::ExitCode;

use clap::Parser;
use error_stack::ResultExt;
use thiserror::Error;
use tracing::{error, info, instrument, Instrument};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use listflex_sync::adapters::config::app_config::AppConfig;
use listflex_sync::adapters::scraping::listflex_session::ListflexSessionFactory;
use listflex_sync::adapters::sheets::spreadsheet_manager::SpreadsheetManager;
use listflex_sync::application::routines::list_integrations_routine::ListIntegrationsRoutine;
use listflex_sync::application::routines::update_list_ids_routine::{
    UpdateListIdsRoutine, UpdateOptions,
};
use listflex_sync::cli::{Cli, Command};
use listflex_sync::ports::routine::Routine;
use listflex_sync::prettyprint::prettyprint::PrettyFormatter;

const LOG_FILE: &str = "listflex_sync.log";
const DEFAULT_LOG_FILTER: &str = "listflex_sync=info";

#[derive(Error, Debug)]
enum CliError {
    #[error("Invalid configuration")]
    Config,
    #[error("Google Sheets is unavailable")]
    Sheets,
    #[error("Routine '{0}' failed")]
    Routine(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = setup_tracing() {
        eprintln!("Failed to set up logging: {error}");
        return ExitCode::FAILURE;
    }
    setup_panic_hook();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            error!("{:?}", report);
            ExitCode::FAILURE
        }
    }
}

fn setup_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let indicatif_layer = IndicatifLayer::new();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(indicatif_layer.get_stderr_writer());

    let log_file_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(false))
        .with_writer(std::fs::File::create(LOG_FILE)?)
        .with_ansi(false);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    Registry::default()
        .with(filter)
        .with(indicatif_layer)
        .with(log_file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}

#[instrument(skip_all)]
async fn run(command: Command) -> error_stack::Result<(), CliError> {
    let config = AppConfig::load().change_context(CliError::Config)?;
    let today = chrono::Local::now().date_naive();

    match command {
        Command::Tenants => {
            for (name, tenant) in &config.tenants {
                println!(
                    "{}\t{}\tclient {}\t{}",
                    name,
                    tenant.base_url,
                    tenant.client_id,
                    tenant.worksheet.resolve(today)
                );
            }
            Ok(())
        }
        Command::List { tenant, worksheet } => {
            let tenant = tenant
                .map(|name| config.tenant(&name).change_context(CliError::Config))
                .transpose()?;

            let worksheet = match (worksheet, tenant) {
                (Some(worksheet), _) => worksheet,
                (None, Some(tenant)) => tenant.worksheet.resolve(today),
                (None, None) => {
                    return Err(error_stack::report!(CliError::Config))
                        .attach_printable("Either --tenant or --worksheet is required")
                }
            };
            let exclusion_token = tenant.map(|tenant| tenant.exclusion_token.to_string());

            let sheets = SpreadsheetManager::new(config.sheets.clone())
                .await
                .change_context(CliError::Sheets)?;

            run_routine(&ListIntegrationsRoutine::new(sheets, worksheet, exclusion_token)).await
        }
        Command::Update {
            tenant,
            worksheet,
            match_policy,
            dry_run,
        } => {
            let tenant_config = config.tenant(&tenant).change_context(CliError::Config)?;

            let options = UpdateOptions {
                worksheet: worksheet.unwrap_or_else(|| tenant_config.worksheet.resolve(today)),
                credentials: tenant_config
                    .credentials()
                    .change_context(CliError::Config)?,
                match_policy: match_policy.unwrap_or(tenant_config.match_policy),
                exclusion_token: tenant_config.exclusion_token.to_string(),
                dry_run,
            };

            info!(
                tenant = %tenant,
                worksheet = %options.worksheet,
                match_policy = %options.match_policy,
                dry_run,
                "Starting update"
            );

            let sheets = SpreadsheetManager::new(config.sheets.clone())
                .await
                .change_context(CliError::Sheets)?;
            let sessions =
                ListflexSessionFactory::new(config.webdriver.clone(), tenant_config.clone());

            let routine = UpdateListIdsRoutine::new(
                format!("update-list-ids[{}]", tenant),
                sheets,
                sessions,
                options,
            );
            run_routine(&routine).await
        }
    }
}

async fn run_routine(routine: &dyn Routine) -> error_stack::Result<(), CliError> {
    let result = routine
        .run()
        .instrument(tracing::span!(
            tracing::Level::INFO,
            "routine",
            routine = routine.name()
        ))
        .await;

    match result {
        Ok(()) => {
            info!("✅ {}: OK", routine.name());
            Ok(())
        }
        Err(report) => Err(report.change_context(CliError::Routine(routine.name().to_owned()))),
    }
}
