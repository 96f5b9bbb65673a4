//! Mortgage calculator CLI
//!
//! Reads a calculation request from a JSON file, stdin, or flags and prints
//! the resulting amortization schedule.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use mortgage_calc::request::{DOWN_PAYMENT, INTEREST_RATE, LOAN_AMOUNT, LOAN_TERM, PAYMENT_TYPE};
use mortgage_calc::{
    handle_request, handle_value, yearly_summary, AmortizationResult, CalculationResponse,
    CostBreakdown,
};
use serde_json::{Map, Value};

const EXIT_INVALID_INPUT: i32 = 1;
const EXIT_COMPUTATION_FAILED: i32 = 2;

#[derive(Parser)]
#[command(author, version, about = "Mortgage amortization schedules", long_about = None)]
struct Cli {
    /// JSON request body with loanAmount, interestRate, loanTerm, and optional
    /// downPayment and paymentType. Use `-` to read stdin.
    #[arg(long, conflicts_with_all = ["loan_amount", "interest_rate", "loan_term", "down_payment", "payment_type"])]
    input: Option<PathBuf>,

    /// Loan amount before the down payment
    #[arg(long, allow_hyphen_values = true)]
    loan_amount: Option<String>,

    /// Annual interest rate in percent (e.g., 6.5)
    #[arg(long, allow_hyphen_values = true)]
    interest_rate: Option<String>,

    /// Term in months
    #[arg(long, allow_hyphen_values = true)]
    loan_term: Option<String>,

    /// Amount paid up front, subtracted from the loan amount
    #[arg(long, allow_hyphen_values = true)]
    down_payment: Option<String>,

    /// `annuity` or `differential`
    #[arg(long)]
    payment_type: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
    Summary,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(EXIT_INVALID_INPUT);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let response = match &cli.input {
        Some(path) => handle_request(&read_body(path)?),
        None => handle_value(&request_from_flags(cli)),
    };

    if !response.is_success() {
        eprintln!("error: {}", error_message(&response));
        return Ok(if response.status >= 500 {
            EXIT_COMPUTATION_FAILED
        } else {
            EXIT_INVALID_INPUT
        });
    }

    match cli.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response.body)?);
        }
        OutputFormat::Table | OutputFormat::Summary => {
            let result: AmortizationResult = serde_json::from_value(response.body)
                .context("Failed to decode calculation result")?;
            info!("calculated {} month schedule", result.schedule.len());
            print_totals(&result);
            if matches!(cli.output, OutputFormat::Table) {
                print_schedule(&result);
            } else {
                print_summary(&result);
            }
        }
    }

    Ok(0)
}

fn read_body(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request from stdin")?;
        return Ok(buffer);
    }

    fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

fn request_from_flags(cli: &Cli) -> Value {
    let mut fields = Map::new();
    let flags = [
        (LOAN_AMOUNT, &cli.loan_amount),
        (INTEREST_RATE, &cli.interest_rate),
        (LOAN_TERM, &cli.loan_term),
        (DOWN_PAYMENT, &cli.down_payment),
        (PAYMENT_TYPE, &cli.payment_type),
    ];
    for (name, value) in flags {
        if let Some(value) = value {
            fields.insert(name.to_string(), Value::String(value.clone()));
        }
    }
    Value::Object(fields)
}

fn error_message(response: &CalculationResponse) -> &str {
    response.body["error"].as_str().unwrap_or("calculation failed")
}

fn print_totals(result: &AmortizationResult) {
    println!("Monthly payment: {:>18.2}", result.monthly_payment);
    println!("Total payment:   {:>18.2}", result.total_payment);
    println!("Total interest:  {:>18.2}", result.total_interest);
    println!();
}

fn print_schedule(result: &AmortizationResult) {
    println!(
        "{:>5} {:>16} {:>16} {:>16} {:>18}",
        "Month", "Payment", "Principal", "Interest", "Balance"
    );
    println!("{}", "-".repeat(75));

    for entry in &result.schedule {
        println!(
            "{:>5} {:>16.2} {:>16.2} {:>16.2} {:>18.2}",
            entry.month,
            entry.payment,
            entry.principal_portion,
            entry.interest_portion,
            entry.remaining_balance,
        );
    }
}

fn print_summary(result: &AmortizationResult) {
    let breakdown = CostBreakdown::from_result(result);
    println!(
        "Principal: {:.2} ({:.1}%)",
        breakdown.principal, breakdown.principal_share_percent
    );
    println!(
        "Interest:  {:.2} ({:.1}%)",
        breakdown.interest, breakdown.interest_share_percent
    );
    println!();

    println!(
        "{:>4} {:>18} {:>18} {:>18} {:>18}",
        "Year", "Payment", "Principal", "Interest", "Balance"
    );
    println!("{}", "-".repeat(80));
    for year in yearly_summary(result) {
        println!(
            "{:>4} {:>18.2} {:>18.2} {:>18.2} {:>18.2}",
            year.year, year.payment, year.principal, year.interest, year.closing_balance,
        );
    }
}
