use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use labdoctor::cli::{Cli, Commands, LogFormat, ReportFormat};
use labdoctor::config::{self, StoreSettings};
use labdoctor::probe::{self, McpProbe};
use labdoctor::{doctor, render_json, render_text, DoctorError, Finding, Session};

fn init_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    tracing_log::LogTracer::init()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match cli.log_format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, DoctorError> {
    match cli.command {
        Commands::Diagnose {
            config: config_path,
            project_ref,
            ids,
            format,
            fail_on_anomaly,
        } => {
            let doctor_config = config::load_or_default(config_path.as_deref())?;
            let layout = config::store_layout(&doctor_config)?;
            let settings = StoreSettings::resolve(&doctor_config.store, project_ref.as_deref())?;
            let options = doctor_config.checks.to_options(&ids);

            let session = Session::open(&settings, layout)?;
            let outcome = doctor::run(&session, &options, Utc::now());
            if let Err(e) = session.close() {
                log::warn!("Failed to close database connection: {}", e);
            }
            let report = outcome?;

            let output = match format {
                ReportFormat::Text => render_text(&report),
                ReportFormat::Json => format!("{}\n", render_json(&report)?),
            };
            print!("{}", output);

            if fail_on_anomaly && report.findings().any(Finding::is_signal) {
                return Ok(ExitCode::from(4));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Probe { endpoint } => {
            let client = McpProbe::new(&endpoint, probe::DEFAULT_TIMEOUT)?;
            let outcome = probe::run(&client);
            print!("{}", outcome.render());
            Ok(if outcome.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
