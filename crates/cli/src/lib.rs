pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use siteboss_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use siteboss_core::LeadInput;

#[derive(Debug, Parser)]
#[command(
    name = "siteboss",
    about = "SiteBoss lead qualification and quoting CLI",
    long_about = "Decide replies to inbound enquiries, price jobs, and inspect engine configuration.",
    after_help = "Examples:\n  siteboss decide \"colorbond fence 20m, budget $4000\"\n  siteboss quote --service timber_fencing --qty 15 --access tight\n  siteboss doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true, help = "Operator config file (defaults to siteboss.toml)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Engine configuration JSON document")]
    engine_config: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level: trace|debug|info|warn|error")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Log format: compact|pretty|json")]
    log_format: Option<LogFormat>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Choose a reply (decline, range, or pass) for an inbound message")]
    Decide {
        text: String,
        #[arg(long, help = "Include the extracted lead, decision, and quote")]
        report: bool,
    },
    #[command(about = "Show the lead extracted from a message")]
    Extract { text: String },
    #[command(about = "Evaluate and price an explicitly described lead")]
    Quote(QuoteArgs),
    #[command(about = "Compute the deposit owed on a job total")]
    Deposit {
        #[arg(allow_hyphen_values = true)]
        total: Decimal,
    },
    #[command(about = "List payment reminders, optionally dated from an invoice date")]
    ChaseSchedule {
        #[arg(long, help = "Invoice date (YYYY-MM-DD)")]
        invoice_date: Option<NaiveDate>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate operator config, engine config integrity, and a sample decision")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct QuoteArgs {
    #[arg(long)]
    service: String,
    #[arg(long, allow_hyphen_values = true)]
    qty: f64,
    #[arg(long)]
    height: Option<String>,
    #[arg(long)]
    access: Option<String>,
    #[arg(long)]
    ground: Option<String>,
    #[arg(long)]
    wet_season: bool,
    #[arg(long, allow_hyphen_values = true)]
    budget: Option<f64>,
}

impl From<QuoteArgs> for LeadInput {
    fn from(args: QuoteArgs) -> Self {
        Self {
            service: Some(args.service),
            budget: args.budget,
            qty: Some(args.qty),
            height: args.height,
            access: args.access,
            ground: args.ground,
            wet_season: args.wet_season,
        }
    }
}

impl GlobalArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                engine_config_path: self.engine_config.clone(),
                log_level: self.log_level.clone(),
                log_format: self.log_format,
            },
        }
    }
}

/// Logs go to stderr; stdout carries only the command payload.
pub fn init_logging(config: &AppConfig) {
    use siteboss_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!(event_name = "cli.logging.already_installed", "subscriber already set");
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();

    // A broken operator config is reported by the command itself.
    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Decide { text, report } => commands::decide::run(&options, &text, report),
        Command::Extract { text } => commands::extract::run(&options, &text),
        Command::Quote(args) => commands::quote::run(&options, args.into()),
        Command::Deposit { total } => commands::billing::deposit(&options, total),
        Command::ChaseSchedule { invoice_date } => {
            commands::billing::chase_schedule(&options, invoice_date)
        }
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
