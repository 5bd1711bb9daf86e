use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use chatlens::aggregate;
use chatlens::chat;
use chatlens::common;
use chatlens::data_loader;
use chatlens::plan;
use chatlens::plan_execution;
use chatlens::snapshot::Snapshot;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a report plan
    Run {
        #[clap(short, long)]
        plan: String,
        #[clap(short, long)]
        watch: bool,
    },
    /// Write a default plan file
    Init {
        #[clap(short, long)]
        plan: String,
    },
    /// Print corpus-wide feedback counts
    Stats {
        #[clap(short, long)]
        input: String,
        /// Only count conversations starting on or after this date (YYYY-MM-DD)
        #[clap(long)]
        from_date: Option<String>,
    },
    /// Print one conversation with its resolved feedback
    Show {
        #[clap(short, long)]
        input: String,
        /// 0-based row index
        #[clap(short, long)]
        row: usize,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Run { plan, watch } => {
            info!("Running plan: {}", plan);
            plan_execution::execute_plan(plan, watch)?;
        }
        Commands::Init { plan } => {
            info!("Initializing plan: {}", plan);
            let plan_file_path = plan;
            let plan = plan::Plan::default();
            let serialized_plan = serde_yaml::to_string(&plan)?;
            common::write_string_to_file(&plan_file_path, &serialized_plan)?;
        }
        Commands::Stats { input, from_date } => {
            print_stats(&input, from_date.as_deref())?;
        }
        Commands::Show { input, row } => {
            show_row(&input, row)?;
        }
    }

    Ok(())
}

fn print_stats(input: &str, from_date: Option<&str>) -> Result<()> {
    let dataset = data_loader::load_transcripts(input, b',')?;
    let snapshot = Snapshot::build(&dataset);

    let from = match from_date {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => bail!("Invalid --from-date '{}', expected YYYY-MM-DD", raw),
        },
        None => None,
    };

    let rows: Vec<usize> = dataset
        .rows()
        .iter()
        .filter(|row| match from {
            Some(from) => row
                .conversation_date()
                .map(|date| date >= from)
                .unwrap_or(false),
            None => true,
        })
        .map(|row| row.index)
        .collect();

    let totals = aggregate::corpus_counts(&snapshot, rows.iter().copied());

    println!("Conversations: {}", rows.len());
    println!("Positive feedback: {}", totals.positive);
    println!("Negative feedback: {}", totals.negative);
    println!("Total feedback: {}", totals.total());
    if totals.total() > 0 {
        let share = totals.positive as f64 / totals.total() as f64 * 100.0;
        println!("Positive share: {:.1}%", share);
    }

    Ok(())
}

fn show_row(input: &str, row: usize) -> Result<()> {
    let dataset = data_loader::load_transcripts(input, b',')?;
    if row >= dataset.len() {
        bail!("Row {} out of range (dataset has {} rows)", row, dataset.len());
    }
    let snapshot = Snapshot::build(&dataset);

    let classification = aggregate::classify_row(&snapshot, row);
    match classification {
        aggregate::RowFeedback::None => println!("=== Row {}", row),
        labelled => println!("=== Row {} [{}]", row, labelled),
    }

    let messages = chat::extract_chat(&snapshot, row);
    if messages.is_empty() {
        println!("(no messages)");
        return Ok(());
    }

    for message in &messages {
        let speaker = if message.from_user { "USER" } else { "BOT" };
        match &message.timestamp {
            Some(timestamp) => println!("{} ({}): {}", speaker, timestamp, message.text),
            None => println!("{}: {}", speaker, message.text),
        }
        for feedback in message.feedbacks {
            println!(
                "  -> {} ({}): {}",
                feedback.reaction,
                feedback.method.as_str(),
                feedback.comment
            );
        }
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("handlebars=off,{}", log_level)))
        .without_time()
        .init();
}
