use std::{fs::OpenOptions, process::ExitCode};

use chrono::Local;
use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::Level;
use tracing_subscriber::{filter, fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};
use uuid::Uuid;

use crate::{
    payroll::{payslip::FsPayslipStore, EmployeeOutcome, PayrollRun},
    period::PayPeriod,
};

mod config;
mod consts;
mod period;
mod utils;

mod entity;
mod payroll;

#[derive(Debug, Parser)]
#[command(about = "Monthly payroll generation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate payrolls and payslips for a month
    Generate {
        /// Month to pay, as YYYY-MM. Defaults to the previous month
        #[arg(long)]
        month: Option<PayPeriod>,

        /// Only process this organization
        #[arg(long)]
        organization: Option<Uuid>,
    },
    /// Store the payslip of an existing payroll again
    Payslip {
        payroll_id: Uuid,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open("trace.log")
        .unwrap();

    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_line_number(true)
                .with_filter(EnvFilter::from_default_env())
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(log_file)
                .with_filter(filter::LevelFilter::from_level(Level::TRACE))
        );

    tracing::subscriber::set_global_default(subscriber).unwrap();

    let cli = Cli::parse();

    let config::Config {
        database_opt,
        payslip_dir,
        policy,
    } = config::load();

    let database = Database::connect(database_opt).await.expect("Unable to connect to database");
    let store = FsPayslipStore::new(payslip_dir);
    let run = PayrollRun::new(&database, &policy, &store);

    match cli.command {
        Command::Generate { month, organization } => {
            let period = month
                .or_else(|| PayPeriod::preceding(Local::now().date_naive()))
                .expect("Unable to determine the previous month");

            let summary = match run.run(&period, organization).await {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::error!(error = ?e, "Unable to list organizations");
                    return ExitCode::FAILURE
                },
            };

            for (employee_id, outcome) in &summary.entries {
                match outcome {
                    EmployeeOutcome::Persisted { payroll_id, payslip_link } => println!(
                        "{employee_id} persisted payroll={payroll_id} payslip={}",
                        payslip_link.as_deref().unwrap_or("-")
                    ),
                    EmployeeOutcome::SkippedDuplicate { existing_payroll_id } => println!(
                        "{employee_id} skipped existing={existing_payroll_id}"
                    ),
                    EmployeeOutcome::Failed(e) => println!("{employee_id} failed: {e}"),
                }
            }

            println!(
                "{period}: persisted={} skipped={} failed={}",
                summary.persisted(),
                summary.skipped(),
                summary.failed()
            );

            if summary.failed() > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS }
        },
        Command::Payslip { payroll_id } => match run.regenerate_payslip(payroll_id).await {
            Ok(link) => {
                println!("{link}");
                ExitCode::SUCCESS
            },
            Err(e) => {
                tracing::error!(error = ?e, %payroll_id, "Unable to regenerate payslip");
                ExitCode::FAILURE
            },
        },
        Command::Migrate => {
            Migrator::up(&database, None).await.expect("Unable to apply migrations");
            ExitCode::SUCCESS
        },
    }
}
