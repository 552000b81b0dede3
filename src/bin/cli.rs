//! Triage Board CLI
//!
//! Offline command-line interface for triage board operations:
//! - Inspect and summarize a shared dataset
//! - Add or delete records and print the new share link
//! - Encode and decode share tokens
//! - Export a spreadsheet
//! - Read a record from an image-analysis reply

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triage_board::board::{
    CategoryCounts, DataSource, Month, MonthSummary, NewRecord, RiskCategory, TriageBoard,
    TriageRecord,
};
use triage_board::config::{Config, ShareConfig};
use triage_board::export::{format_br_date, write_csv};
use triage_board::{extract, share};

#[derive(Parser)]
#[command(name = "triage-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hospital triage dashboard data tool")]
#[command(long_about = "Works on datasets carried in dashboard share links.\nPass the link (or just its token) with --data; without it the sample dataset is used.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Share link or token holding the dataset
    #[arg(short, long, global = true)]
    pub data: Option<String>,

    /// Config file (default: search the standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dashboard URL for generated links (overrides the config)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List records
    Show {
        /// Only this month (YYYY-MM), newest day first
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Monthly summary (default: latest month)
    Summary {
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Compare records side by side
    Compare {
        /// Record ids (comma-separated or multiple args)
        ids: Vec<String>,
    },

    /// Add a record and print the new share link
    Add {
        /// Day (YYYY-MM-DD, default: today)
        #[arg(long)]
        day: Option<String>,
        #[arg(long, default_value = "0")]
        vermelho: u32,
        #[arg(long, default_value = "0")]
        laranja: u32,
        #[arg(long, default_value = "0")]
        amarelo: u32,
        #[arg(long, default_value = "0")]
        verde: u32,
        #[arg(long, default_value = "0")]
        azul: u32,
    },

    /// Delete a record and print the new share link
    Delete {
        /// Record id
        id: String,
    },

    /// Encode a JSON array of records into a share token
    Encode {
        /// Path to JSON file ("-" for stdin)
        path: PathBuf,
    },

    /// Decode a share token or link, reporting its format
    Decode {
        /// Token or full share link
        token: String,
    },

    /// Export the dataset as a CSV spreadsheet
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse an image-analysis reply into a record
    Extract {
        /// File holding the model reply ("-" for stdin)
        path: PathBuf,
        /// Add the record to the dataset and print the new link
        #[arg(long)]
        append: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Keep stdout clean for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triage_board=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.base_url {
        config.share.public_url = url.clone();
    }
    let share_config = config.share;
    let json = cli.format.eq_ignore_ascii_case("json");

    match cli.command {
        Commands::Show { month } => {
            let (board, source) = load_board(cli.data.as_deref(), &share_config);
            report_source(source);

            let records: Vec<&TriageRecord> = match parse_month(month.as_deref())? {
                Some(month) => board.table(month),
                None => board.records().iter().collect(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_table(&records);
            }
        }

        Commands::Summary { month } => {
            let (board, source) = load_board(cli.data.as_deref(), &share_config);
            report_source(source);

            let Some(month) = parse_month(month.as_deref())?.or_else(|| board.latest_month())
            else {
                println!("No records");
                return Ok(());
            };
            let summary = board.summary(month);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }

        Commands::Compare { ids } => {
            let (board, source) = load_board(cli.data.as_deref(), &share_config);
            report_source(source);

            // Flatten ids (support comma-separated)
            let ids: Vec<String> = ids
                .iter()
                .flat_map(|id| id.split(',').map(|s| s.trim().to_string()))
                .filter(|id| !id.is_empty())
                .collect();

            for id in ids.iter().filter(|id| board.get(id).is_none()) {
                eprintln!("No record with id {}", id);
            }

            let records = board.comparison(&ids);
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_table(&records);
            }
        }

        Commands::Add {
            day,
            vermelho,
            laranja,
            amarelo,
            verde,
            azul,
        } => {
            let now = Utc::now();
            let day = match day.as_deref() {
                None => now.date_naive(),
                Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .with_context(|| format!("Invalid day {:?}, expected YYYY-MM-DD", s))?,
            };

            let (mut board, source) = load_board(cli.data.as_deref(), &share_config);
            report_source(source);

            let counts = CategoryCounts::new(vermelho, laranja, amarelo, verde, azul);
            let record = board.add(NewRecord::new(day, counts), now);
            println!(
                "Added {} ({} patients) as id {}",
                format_br_date(record.day),
                record.total,
                record.id
            );
            print_link(&board, &share_config)?;
        }

        Commands::Delete { id } => {
            let (mut board, source) = load_board(cli.data.as_deref(), &share_config);
            report_source(source);

            let removed = board.delete(&id)?;
            println!("Deleted {} ({})", removed.id, format_br_date(removed.day));
            print_link(&board, &share_config)?;
        }

        Commands::Encode { path } => {
            let text = read_input(&path)?;
            let records = share::parse_records(&text)
                .with_context(|| format!("Failed to read records from {:?}", path))?;

            let board = TriageBoard::new(records);
            board.validate()?;
            print_link(&board, &share_config)?;
        }

        Commands::Decode { token } => {
            let token = share::token_from_link(&token, &share_config.param)
                .context("No token found in input")?;
            let decoded = share::decode(&token)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&decoded.records)?);
            } else {
                println!(
                    "Format: {}{}",
                    decoded.format,
                    if decoded.format.is_legacy() { " (legacy)" } else { "" }
                );
                let records: Vec<&TriageRecord> = decoded.records.iter().collect();
                print_table(&records);
            }

            if decoded.format.is_legacy() {
                // Re-share in the current format
                print_link(&TriageBoard::new(decoded.records), &share_config)?;
            }
        }

        Commands::Export { output } => {
            let (board, source) = load_board(cli.data.as_deref(), &share_config);
            report_source(source);

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    let file = std::fs::File::create(&path)?;
                    write_csv(board.records(), file)?;
                    println!("Exported {} records to {:?}", board.len(), path);
                }
                None => {
                    write_csv(board.records(), std::io::stdout().lock())?;
                }
            }
        }

        Commands::Extract { path, append } => {
            let text = read_input(&path)?;
            let now = Utc::now();
            let extracted = extract::parse_ai_response(&text, now.date_naive())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&extracted)?);
            } else {
                println!("Day: {}", format_br_date(extracted.day));
                for category in RiskCategory::ALL {
                    println!("{:<16} {}", category.label(), extracted.counts.get(category));
                }
                println!("{:<16} {}", "Total", extracted.counts.sum());
            }

            if append {
                let (mut board, source) = load_board(cli.data.as_deref(), &share_config);
                report_source(source);

                let record = board.add(extracted, now);
                println!("Added as id {}", record.id);
                print_link(&board, &share_config)?;
            }
        }

        Commands::Config { output } => {
            let config = triage_board::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn load_board(data: Option<&str>, share_config: &ShareConfig) -> (TriageBoard, DataSource) {
    let token = data.and_then(|d| share::token_from_link(d, &share_config.param));
    TriageBoard::from_token(token.as_deref())
}

fn report_source(source: DataSource) {
    match source {
        DataSource::Shared(format) if format.is_legacy() => {
            eprintln!("Loaded shared data ({} link)", format)
        }
        DataSource::Shared(_) => {}
        DataSource::Sample => eprintln!("Using sample dataset"),
    }
}

fn parse_month(month: Option<&str>) -> anyhow::Result<Option<Month>> {
    match month.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(anyhow::Error::msg),
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !path.exists() {
        bail!("File not found: {:?}", path);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn print_link(board: &TriageBoard, share_config: &ShareConfig) -> anyhow::Result<()> {
    let token = board.to_token()?;
    println!("Token: {}", token);
    println!("Link:  {}", share_config.link_for(&token));
    Ok(())
}

fn print_table(records: &[&TriageRecord]) {
    if records.is_empty() {
        println!("No records");
        return;
    }

    // Header
    print!("{:<14} | {:<10}", "ID", "Data");
    for category in RiskCategory::ALL {
        print!(" | {:<8}", category.key());
    }
    println!(" | {:<6}", "total");

    // Separator
    println!("{}", "-".repeat(27 + RiskCategory::ALL.len() * 11 + 9));

    for record in records {
        print!("{:<14} | {:<10}", record.id, format_br_date(record.day));
        for category in RiskCategory::ALL {
            print!(" | {:<8}", record.counts.get(category));
        }
        println!(" | {:<6}", record.total);
    }
}

fn print_summary(summary: &MonthSummary) {
    println!("Resumo de {}", summary.label);
    println!("Records: {}", summary.days);
    println!();

    for category in RiskCategory::ALL {
        println!("{:<16} {:>6}", category.label(), summary.totals.get(category));
    }
    println!("{:<16} {:>6}", "Total", summary.total);
    println!();

    if let Some(peak) = &summary.peak {
        println!("Peak: {} ({} patients)", format_br_date(peak.day), peak.total);
    }
    if let Some(low) = &summary.low {
        println!("Low:  {} ({} patients)", format_br_date(low.day), low.total);
    }

    if let Some(last) = &summary.last_day {
        println!();
        println!("Last day: {}", format_br_date(last.record.day));
        for share in &last.shares {
            println!("  {:<16} {:>4} {:>5.1}%", share.label, share.count, share.percent);
        }
    }
}
