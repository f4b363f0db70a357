//! `lostfound` - CLI for the lost-and-found desk
//!
//! Runs the web application and offers read-only inspection of the
//! report database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use lostfound::cli::{Cli, Command, ConfigCommand, ReportsCommand, ServeCommand};
use lostfound::{init_logging, tracking, web, AppState, Config, Report, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Validation gets its own chance to report a broken file.
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        return handle_validate(file.clone().or_else(|| cli.config.clone()));
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, serve_cmd).await,
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Reports(reports_cmd) => handle_reports(&config, reports_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_serve(config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    let addr = match cmd.bind {
        Some(addr) => addr,
        None => config.bind_addr()?,
    };

    let state = AppState::from_config(&config)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    web::run(listener, state, web::shutdown_signal()).await?;
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;
    let metrics = storage.metrics()?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "metrics": metrics,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("lostfound status");
        println!("----------------");
        println!("Database:      {}", storage.path().display());
        println!("Total reports: {}", metrics.total);
        println!("Found:         {}", metrics.found);
        println!("Open cases:    {}", metrics.open_cases);
        println!("Claimed:       {}", metrics.claimed);
    }
    Ok(())
}

fn handle_reports(config: &Config, cmd: ReportsCommand) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;

    match cmd {
        ReportsCommand::List { limit, json } => {
            let reports = storage.list_recent(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else if reports.is_empty() {
                println!("No reports yet.");
            } else {
                for report in &reports {
                    println!(
                        "{}  {:<10}  {}  {} ({})",
                        report.tracking_id,
                        report.stage().label(),
                        report.created_at_display(),
                        report.item_name,
                        report.passenger_name
                    );
                }
            }
        }
        ReportsCommand::Show { tracking_id, json } => {
            let tracking_id = tracking::normalize(&tracking_id);
            let report = storage
                .find_by_tracking_id(&tracking_id)?
                .with_context(|| format!("no report found for {tracking_id}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }
    Ok(())
}

fn print_report(report: &Report) {
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };
    println!("Report {}", report.tracking_id);
    println!("  Passenger:   {}", report.passenger_name);
    println!("  Item:        {}", report.item_name);
    println!("  Description: {}", report.description);
    println!("  Found:       {}", yes_no(report.found_status));
    println!("  Claimed:     {}", yes_no(report.claim_status));
    println!("  Stage:       {}", report.stage());
    println!("  Reported at: {} UTC", report.created_at_display());
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let shown = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", shown.server.bind_addr);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", shown.database_path().display());
                println!();
                println!("[Auth]");
                println!("  Secret key:         {}", shown.auth.secret_key);
                println!("  Admin password:     {}", shown.auth.admin_password);
                println!();
                println!("[Display]");
                println!("  Recent limit:       {}", shown.display.recent_limit);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            handle_validate(file)?;
        }
    }
    Ok(())
}

fn handle_validate(file: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => println!("Configuration is valid."),
        Err(e) => anyhow::bail!("Configuration error: {e}"),
    }
    Ok(())
}
