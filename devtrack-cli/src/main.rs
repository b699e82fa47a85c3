mod cli;
mod display;
mod prompts;
mod session;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use devtrack_core::{
    determine_data_source, export_snapshot, get_config_path, load_snapshot, Config, DataSource,
    MonthKey, RequestFilter, SnapshotFormat, Tracker,
};

use crate::cli::{Cli, Command, ConfigCommand};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = get_config_path()?;
    let config = Config::load_or_default(&config_path)?;
    init_tracing(cli.verbose, config.log_filter.as_deref());

    let today = Local::now().date_naive();
    let load = || load_tracker(cli.data.as_deref(), &config);

    match &cli.command {
        Command::Dashboard => {
            let tracker = load()?;
            display::print_dashboard(tracker.requests.all());
        }
        Command::List {
            search,
            priority,
            stage,
        } => {
            let tracker = load()?;
            let filter = RequestFilter {
                search_term: search.clone(),
                priority: parse_filter(priority)?,
                stage: parse_filter(stage)?,
            };
            display::print_request_table(&tracker.requests.list(&filter));
        }
        Command::Show { id } => {
            let tracker = load()?;
            let req = tracker
                .requests
                .get(id)
                .with_context(|| format!("Request '{}' not found", id))?;
            display::print_request(req, &tracker.items);
        }
        Command::Mis { month } => {
            let tracker = load()?;
            let month = parse_month(month)?.unwrap_or_else(|| MonthKey::from_date(today).previous());
            display::print_mis(tracker.requests.all(), month);
        }
        Command::Report { month, section } => {
            let mut tracker = load()?;
            let month = parse_month(month)?.unwrap_or_else(|| MonthKey::from_date(today));
            let report = tracker.reports.get(month);
            match section {
                Some(name) => display::print_report_section(report, month, name)?,
                None => display::print_report(report, month),
            }
        }
        Command::Export { format, output } => {
            let tracker = load()?;
            handle_export_command(&tracker, format.as_deref(), output.as_deref())?;
        }
        Command::Config { command } => {
            handle_config_command(command, &config_path, config.clone())?;
        }
        Command::Session { export } => {
            let mut tracker = load()?;
            session::run(&mut tracker, &config, export.as_deref())?;
        }
    }

    Ok(())
}

/// Sets up the stderr log subscriber.
///
/// `-v`/`-vv` raise the default level; otherwise `RUST_LOG` wins over the
/// config file's `log_filter`.
fn init_tracing(verbose: u8, config_filter: Option<&str>) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let builder = EnvFilter::builder().with_default_directive(level.into());
    let filter = match config_filter {
        Some(directives) if verbose == 0 && std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() => {
            builder.parse_lossy(directives)
        }
        _ => builder.from_env_lossy(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_tracker(data_flag: Option<&Path>, config: &Config) -> Result<Tracker> {
    match determine_data_source(data_flag, config) {
        DataSource::Snapshot(path) => {
            let snapshot = load_snapshot(&path)
                .with_context(|| format!("Failed to load snapshot: {:?}", path))?;
            tracing::info!(path = %path.display(), requests = snapshot.requests.len(), "loaded snapshot");
            Ok(Tracker::from_snapshot(snapshot))
        }
        DataSource::Sample => Tracker::with_sample_data().context("Failed to load sample data"),
    }
}

/// Parses an optional filter value; blank or "all" means no filter.
fn parse_filter<T>(value: &Option<String>) -> Result<Option<T>>
where
    T: FromStr<Err = devtrack_core::Error>,
{
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => Ok(Some(v.parse()?)),
    }
}

fn parse_month(value: &Option<String>) -> Result<Option<MonthKey>> {
    value
        .as_deref()
        .map(|v| v.parse::<MonthKey>())
        .transpose()
        .map_err(Into::into)
}

fn handle_export_command(
    tracker: &Tracker,
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let format = match (format, output) {
        (Some(f), _) => f.parse()?,
        (None, Some(path)) => SnapshotFormat::from_path(path),
        (None, None) => SnapshotFormat::Yaml,
    };
    let content = export_snapshot(tracker, format)?;

    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write snapshot to {:?}", path))?;
            eprintln!(
                "{} Exported {} requests to {}",
                "✓".green(),
                tracker.requests.len(),
                path.display()
            );
        }
        None => print!("{}", content),
    }

    Ok(())
}

fn handle_config_command(cmd: &ConfigCommand, config_path: &Path, mut config: Config) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            println!("{}", "Configuration:".blue().bold());
            println!();
            println!("{}: {}", "Path".cyan(), config_path.display());
            if !config_path.exists() {
                println!("  {}", "(file does not exist; using defaults)".dimmed());
            }
            println!(
                "{}: {}",
                "Data file".cyan(),
                config.data_file.as_deref().unwrap_or("(built-in sample data)")
            );
            println!(
                "{}: {}",
                "User name".cyan(),
                config.user_name.as_deref().unwrap_or("-")
            );
            println!(
                "{}: {}",
                "Log filter".cyan(),
                config.log_filter.as_deref().unwrap_or("warn")
            );
        }
        ConfigCommand::Init => {
            Config::create_default(config_path)?;
            println!("{} Config file at {}", "✓".green(), config_path.display());
        }
        ConfigCommand::SetUser { name } => {
            config.user_name = Some(name.clone());
            config.save(config_path)?;
            println!("{} User name set to {}", "✓".green(), name);
        }
        ConfigCommand::SetData { path } => {
            config.data_file = path.clone();
            config.save(config_path)?;
            match path {
                Some(p) => println!("{} Data file set to {}", "✓".green(), p),
                None => println!("{} Data file cleared; using sample data", "✓".green()),
            }
        }
    }

    Ok(())
}
