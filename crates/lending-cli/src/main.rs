mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::loan::{ProgressArgs, QuoteArgs, ScheduleArgs};

/// Decimal-precision retail lending calculations
#[derive(Parser)]
#[command(
    name = "lend",
    version,
    about = "Decimal-precision retail lending calculations",
    long_about = "Quote fixed-rate annuity loans, project amortization progress \
                  as of any date, and print full installment schedules, all with \
                  decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a fixed-rate loan (monthly payment, totals, insurance)
    Quote(QuoteArgs),
    /// Project amortization progress as of a date
    Progress(ProgressArgs),
    /// Print the full installment schedule
    Schedule(ScheduleArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Quote(args) => commands::loan::run_quote(args),
        Commands::Progress(args) => commands::loan::run_progress(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Version => {
            println!("lend {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
