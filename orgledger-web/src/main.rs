use anyhow::Context;
use clap::Parser;
use orgledger_web::{init_logging, PortalServer, WebConfig};

#[derive(Parser)]
#[command(name = "orgledger-web")]
#[command(about = "Orgledger activity-record portal")]
struct Args {
    /// Server host
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Session lifetime in seconds
    #[arg(long)]
    session_ttl: Option<i64>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var(
            "RUST_LOG",
            format!("orgledger_web={},tower_http=info", args.log_level),
        );
    }
    init_logging();

    let mut config = WebConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(ttl) = args.session_ttl {
        config.session_ttl_secs = ttl;
    }

    let server = PortalServer::new(config);
    server.start().await.context("portal server failed")?;
    Ok(())
}
