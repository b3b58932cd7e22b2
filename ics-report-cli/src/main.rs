//! ICS Weekly Report CLI Application
//!
//! This is the command-line interface for the ICS event parser.
//! It uses the ics-event-parser library and adds:
//! - Reading the calendar file from disk
//! - Prompting for the file and week when they are not given as arguments
//! - TOML configuration
//! - Weekly report generation (TXT/JSON)

use anyhow::{Context, Result};
use clap::Parser;
use ics_event_parser::{ErrorPolicy, EventParser, EventRecord, ParserConfig};
use std::path::{Path, PathBuf};

mod config;
mod input;
mod report;

use config::{AppConfig, OutputFormat};
use report::{WeekRange, WeeklyReport};

/// ICS Report - Summarize calendar events for one week
#[derive(Parser, Debug)]
#[command(name = "ics-report")]
#[command(about = "Parse an ICS calendar file and report events for a week", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the ICS file (prompted for if omitted)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// First day of the reported week (prompted for if omitted)
    #[arg(short, long, value_name = "YYYY-MM-DD")]
    week_start: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Skip events with unparseable dates instead of aborting
    #[arg(long)]
    lenient: bool,

    /// Join folded continuation lines before parsing
    #[arg(long)]
    unfold: bool,

    /// Print every parsed event before the report
    #[arg(long)]
    all: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("ICS Report CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using parser library v{}", ics_event_parser::VERSION);

    let config = resolve_config(&args)?;

    if args.file.is_none() || args.week_start.is_none() {
        println!("ICS Calendar Report Generator");
        println!("=============================");
    }
    let file = match &args.file {
        Some(path) => path.clone(),
        None => PathBuf::from(input::prompt("Enter ICS file path: ")?),
    };
    let week_start = match &args.week_start {
        Some(week) => week.clone(),
        None => input::prompt("Enter week start date (YYYY-MM-DD): ")?,
    };
    let week = WeekRange::parse(&week_start)?;

    let events = load_events(&file, &config.parser)?;
    if events.is_empty() {
        println!("No events found or file could not be read.");
        return Ok(());
    }
    log::info!("Found {} events total", events.len());

    let report = WeeklyReport::build(&events, week);
    match config.report.format {
        OutputFormat::Txt => {
            if config.report.list_all_events {
                for event in &events {
                    println!("{}", event);
                }
                println!();
            }
            print!("{}", report);
        }
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}

/// Config file values, overridden by command line flags
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if args.lenient {
        config.parser.error_policy = ErrorPolicy::Lenient;
    }
    if args.unfold {
        config.parser.unfold_lines = true;
    }
    if let Some(format) = args.format {
        config.report.format = format;
    }
    if args.all {
        config.report.list_all_events = true;
    }

    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Read and parse the calendar file
///
/// An unreadable file yields no events; a date error under the strict policy
/// aborts.
fn load_events(path: &Path, parser_config: &ParserConfig) -> Result<Vec<EventRecord>> {
    log::info!("Parsing calendar file: {:?}", path);

    let content = match input::read_calendar(path) {
        Ok(content) => content,
        Err(e) => {
            log::error!("{:#}", e);
            return Ok(Vec::new());
        }
    };

    EventParser::with_config(parser_config.clone())
        .parse(&content)
        .with_context(|| format!("Failed to parse calendar file: {:?}", path))
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
