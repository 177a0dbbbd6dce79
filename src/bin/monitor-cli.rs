use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "monitor-cli")]
#[command(about = "Inspect the monitoring core's operator endpoint", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:9464")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check monitor status and uptime
    Status,
    /// Fetch the full consolidated monitoring document
    Monitoring,
    /// Fetch the current metrics snapshot
    Metrics,
    /// List active alerts and alert history
    Alerts {
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
    /// Fetch recent structured log entries
    Logs {
        #[arg(short, long, default_value_t = 100)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let url = match &cli.command {
        Commands::Status => format!("{}/status", cli.url),
        Commands::Monitoring => format!("{}/monitoring", cli.url),
        Commands::Metrics => format!("{}/monitoring/metrics", cli.url),
        Commands::Alerts { limit } => {
            format!("{}/monitoring/alerts?limit={}", cli.url, limit)
        }
        Commands::Logs { limit } => format!("{}/monitoring/logs?limit={}", cli.url, limit),
    };

    let res = client.get(&url).send().await?;
    if !res.status().is_success() {
        eprintln!("Request failed: {} {}", res.status(), url);
        std::process::exit(1);
    }

    let body: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
