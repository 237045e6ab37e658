use clap::{Parser, Subcommand};
use financial_advisor_engine::{
    format::format_amount, AdvisorConfig, AdvisorContext, TaxpayerProfile, UserProfile,
    WealthPlanInput, WealthProjection,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scheme eligibility, tax regime and wealth projection from JSON input files
#[derive(Parser, Debug)]
#[command(name = "advisor", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Match a user profile against the scheme rule table
    Schemes { input: PathBuf },
    /// Compare old and new tax regimes for a taxpayer profile
    Tax { input: PathBuf },
    /// Project a SIP plan and rank investment schemes
    Wealth {
        input: PathBuf,
        /// Print a year-by-year table instead of JSON
        #[arg(long)]
        table: bool,
        /// Number of recommendations to return
        #[arg(long)]
        top_n: Option<usize>,
    },
}

fn read_input<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_table(projection: &WealthProjection) {
    println!(
        "{:>4}  {:>16}  {:>14}  {:>14}  {:>16}",
        "Year", "Opening", "Invested", "Interest", "Closing"
    );
    for row in &projection.rows {
        println!(
            "{:>4}  {:>16}  {:>14}  {:>14}  {:>16}",
            row.year,
            format_amount(row.opening_capital, 2),
            format_amount(row.annual_investment, 2),
            format_amount(row.interest_earned, 2),
            format_amount(row.closing_capital, 2),
        );
    }

    println!();
    println!("Corpus:                    ₹{}", format_amount(projection.corpus, 2));
    println!(
        "Inflation-adjusted corpus: ₹{}",
        format_amount(projection.inflation_adjusted_corpus, 2)
    );
    println!(
        "Total invested:            ₹{}",
        format_amount(projection.total_invested, 2)
    );

    if !projection.recommendations.is_empty() {
        println!("\nRecommended schemes:");
        for (i, rec) in projection.recommendations.iter().enumerate() {
            println!("  {}. {} ({:.2}%)", i + 1, rec.scheme_name, rec.confidence * 100.0);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AdvisorConfig::from_env()?;
    let context = AdvisorContext::from_config(&config)?;

    info!(command = ?cli.command, "Advisor starting");

    match cli.command {
        Command::Schemes { input } => {
            let profile: UserProfile = read_input(&input)?;
            let result = context.eligible_schemes(&profile)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Tax { input } => {
            let profile: TaxpayerProfile = read_input(&input)?;
            let result = context.compare_tax(&profile)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Wealth {
            input,
            table,
            top_n,
        } => {
            let plan: WealthPlanInput = read_input(&input)?;
            let projection = context.project_wealth(&plan, top_n)?;
            if table {
                print_table(&projection);
            } else {
                println!("{}", serde_json::to_string_pretty(&projection)?);
            }
        }
    }

    Ok(())
}
