//! commitaudit — finds committed-use capacity that no running instance consumes.

use std::path::{Path, PathBuf};

use commitaudit_collector::{AuditReport, Collector, GcpComputeClient, SnapshotApi};
use commitaudit_core::AuditConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod report;

fn print_help() {
    println!("commitaudit — idle committed-use capacity audit");
    println!();
    println!("Usage: commitaudit [command]");
    println!();
    println!("Commands:");
    println!("  audit [config]                 Audit live projects (default)");
    println!("  reconcile <snapshot> [config]  Audit a JSON snapshot offline");
    println!("  help                           Show this help message");
    println!();
    println!("Environment:");
    println!("  COMMITAUDIT_PROJECTS           Comma-separated project list");
    println!("  COMMITAUDIT_API_URL            Compute API base URL");
    println!("  COMMITAUDIT_ERROR_POLICY       abort | skip");
    println!("  COMMITAUDIT_OUTPUT             text | json");
    println!("  GOOGLE_OAUTH_ACCESS_TOKEN      Bearer token for live audits");
}

async fn audit_live(config_path: Option<&Path>) -> anyhow::Result<AuditReport> {
    let config = AuditConfig::load(config_path)?;
    config.validate(true)?;

    info!("Compute API: {}", config.api_base_url);
    let client = GcpComputeClient::new(&config)?;
    let collector = Collector::new(client, &config);
    let report = collector.run(&config.projects).await?;
    report::emit(&report, config.output)?;
    Ok(report)
}

async fn audit_snapshot(
    snapshot_path: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<AuditReport> {
    let mut config = AuditConfig::load(config_path)?;
    let api = SnapshotApi::load(snapshot_path)?;
    if config.projects.is_empty() {
        config.projects = api.projects();
    }
    config.validate(false)?;

    let collector = Collector::new(api, &config);
    let report = collector.run(&config.projects).await?;
    report::emit(&report, config.output)?;
    Ok(report)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let report = match args.get(1).map(String::as_str) {
        None => audit_live(None).await?,
        Some("audit") => audit_live(args.get(2).map(Path::new)).await?,
        Some("reconcile") | Some("--reconcile") => {
            let Some(snapshot) = args.get(2) else {
                eprintln!("Usage: commitaudit reconcile <snapshot.json> [config.json]");
                std::process::exit(1);
            };
            let snapshot = PathBuf::from(snapshot);
            audit_snapshot(&snapshot, args.get(3).map(Path::new)).await?
        }
        Some("--help") | Some("-h") | Some("help") => {
            print_help();
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'commitaudit help' for usage.", other);
            std::process::exit(1);
        }
    };

    std::process::exit(if report.issues.is_empty() { 0 } else { 1 });
}
