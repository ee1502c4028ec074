use bmi_core::*;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bmitrack")]
#[command(about = "BMI calculator and history tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute BMI without saving anything
    Calc {
        /// Weight in kilograms
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,

        /// Height in metres
        #[arg(long, allow_negative_numbers = true)]
        height: f64,
    },

    /// Compute BMI and save it to a user's history
    Add {
        /// User name
        user: String,

        /// Weight in kilograms
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,

        /// Height in metres
        #[arg(long, allow_negative_numbers = true)]
        height: f64,

        /// Measurement time (RFC 3339), defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<DateTime<Utc>>,
    },

    /// List users with saved records
    Users,

    /// Show a user's records and statistics
    History {
        /// User name
        user: String,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show mean/min/max BMI for a user
    Stats {
        /// User name
        user: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a user's history as CSV
    Export {
        /// User name
        user: String,

        /// Destination file (defaults to <user>_bmi_history.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    bmi_core::logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    let precision = config.display.precision;

    match cli.command {
        Commands::Calc { weight, height } => cmd_calc(weight, height, precision),
        Commands::Add {
            user,
            weight,
            height,
            at,
        } => {
            let mut store = SqliteStore::open(config.database_path())?;
            cmd_add(&mut store, &user, weight, height, at, precision)?;
            store.close()
        }
        Commands::Users => {
            let store = SqliteStore::open(config.database_path())?;
            cmd_users(&store)?;
            store.close()
        }
        Commands::History { user, json } => {
            let store = SqliteStore::open(config.database_path())?;
            cmd_history(&store, &user, json, precision)?;
            store.close()
        }
        Commands::Stats { user, json } => {
            let store = SqliteStore::open(config.database_path())?;
            cmd_stats(&store, &user, json, precision)?;
            store.close()
        }
        Commands::Export { user, output } => {
            let store = SqliteStore::open(config.database_path())?;
            cmd_export(&store, &user, output)?;
            store.close()
        }
    }
}

fn cmd_calc(weight: f64, height: f64, precision: usize) -> Result<()> {
    let reading = compute(weight, height)?;
    println!("BMI: {:.*}", precision, reading.bmi);
    println!("Category: {}", reading.category);
    Ok(())
}

fn cmd_add(
    store: &mut SqliteStore,
    user: &str,
    weight: f64,
    height: f64,
    at: Option<DateTime<Utc>>,
    precision: usize,
) -> Result<()> {
    let timestamp = at.unwrap_or_else(Utc::now);
    let record = store.add_record(user, weight, height, timestamp)?;

    println!("BMI: {:.*}", precision, record.bmi);
    println!("Category: {}", record.category);
    println!(
        "\n✓ Saved record for {} (BMI {:.*}, {})",
        record.user_id, precision, record.bmi, record.category
    );
    Ok(())
}

fn cmd_users(store: &SqliteStore) -> Result<()> {
    let users = store.list_users()?;
    if users.is_empty() {
        println!("No users yet.");
        return Ok(());
    }
    for user in users {
        println!("{}", user);
    }
    Ok(())
}

fn cmd_history(store: &SqliteStore, user: &str, json: bool, precision: usize) -> Result<()> {
    let records = store.list_records(user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!(
        "{:<20} {:>12} {:>11} {:>8}  {}",
        "Date", "Weight (kg)", "Height (m)", "BMI", "Category"
    );
    for record in &records {
        println!(
            "{:<20} {:>12.*} {:>11.*} {:>8.*}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            precision,
            record.weight_kg,
            precision,
            record.height_m,
            precision,
            record.bmi,
            record.category
        );
    }
    println!();

    match summarize_records(&records) {
        Some(summary) => print_summary(&summary, precision),
        None => println!("Mean BMI: N/A  Min BMI: N/A  Max BMI: N/A"),
    }
    Ok(())
}

fn cmd_stats(store: &SqliteStore, user: &str, json: bool, precision: usize) -> Result<()> {
    let summary = summarize(store, user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Records: {}", summary.count);
        print_summary(&summary, precision);
    }
    Ok(())
}

fn cmd_export(store: &SqliteStore, user: &str, output: Option<PathBuf>) -> Result<()> {
    let records = store.list_records(user)?;
    if records.is_empty() {
        println!("No records for {}; nothing to export.", user.trim());
        return Ok(());
    }

    let destination = output.unwrap_or_else(|| PathBuf::from(default_export_file_name(user)));
    bmi_core::export::write_records(&records, &destination)?;
    tracing::info!("Exported {} records to {:?}", records.len(), destination);

    println!("✓ Exported {} records", records.len());
    println!("  CSV: {}", destination.display());
    Ok(())
}

fn print_summary(summary: &BmiSummary, precision: usize) {
    println!(
        "Mean BMI: {:.*}  Min BMI: {:.*}  Max BMI: {:.*}",
        precision, summary.mean, precision, summary.min, precision, summary.max
    );
}

fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}
