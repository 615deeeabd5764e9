//! clusterfiles - install files onto a cluster of hosts over SSH

use clap::Parser;
use clusterfiles_cli::cli::Cli;
use clusterfiles_cli::output::json::format_error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_directive())),
        )
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    if let Err(e) = cli.run().await {
        match format_error(&format!("{e:#}"), "COMMAND_FAILED") {
            Ok(body) if json => println!("{body}"),
            _ => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}
