use anyhow::Context;
use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use mw_core::{Report, ReportService, RuntimeConfig};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mw")]
#[command(about = "MediWhisper consultation report CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and store a report from a transcript
    Generate {
        /// Read the transcript from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List stored reports, newest first
    List,
    /// Show a stored report
    Show {
        /// Report id
        id: String,
        /// Print the report as Markdown instead of JSON
        #[arg(long)]
        markdown: bool,
    },
    /// Delete a stored report
    Delete {
        /// Report id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output can be piped.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("mw_core=warn".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'mw --help' for commands");
        return Ok(());
    };

    let cfg = RuntimeConfig::from_env()?;
    let service = ReportService::from_runtime_config(&cfg)?;

    match command {
        Commands::Generate { file } => {
            let transcript = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read transcript from stdin")?;
                    buf
                }
            };

            let generated = service.generate_report(&transcript).await?;
            println!("Stored report {} ({})", generated.report.id, generated.report.title);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "soap": generated.soap,
                    "diagnosis": generated.diagnosis,
                }))?
            );
        }
        Commands::List => {
            let reports = service.list_reports()?;
            if reports.is_empty() {
                println!("No reports found.");
            } else {
                for report in &reports {
                    println!("{}", list_line(report));
                }
            }
        }
        Commands::Show { id, markdown } => {
            if markdown {
                print!("{}", service.render_markdown(&id)?);
            } else {
                let report = service.get_report(&id)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Commands::Delete { id } => {
            service.delete_report(&id)?;
            println!("Deleted report {id}");
        }
    }

    Ok(())
}

fn list_line(report: &Report) -> String {
    format!(
        "ID: {}, Title: {}, Created: {}",
        report.id,
        report.title,
        report.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
