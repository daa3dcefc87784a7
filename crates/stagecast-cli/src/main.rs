//! stagecast CLI — run the screen/window-sharing signaling coordinator.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stagecast_coordinator::{setup, Coordinator, StaticTargetSource};
use stagecast_protocol::{QuicTransport, SelfSignedCert};

#[derive(Parser)]
#[command(
    name = "stagecast",
    about = "Coordinate screen and window sharing sessions",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling coordinator.
    Start {
        /// Path to configuration file.
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Generate a TLS certificate for this coordinator.
    GenerateCert {
        /// Output directory for certificate files.
        #[arg(short, long, default_value = ".")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { config } => {
            let config = setup::load_config(config.as_deref())?;
            let (cert_pem, key_pem) = setup::load_or_generate_certs(&setup::config_dir())?;

            let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid bind address: {e}"))?;
            let transport = QuicTransport::bind(addr, &cert_pem, &key_pem)?;

            tracing::info!(addr = %addr, "starting stagecast coordinator");
            let mut coordinator =
                Coordinator::new(config, transport, Arc::new(StaticTargetSource));
            coordinator.run().await?;
        }
        Commands::GenerateCert { output } => {
            let hostname = setup::local_hostname();
            tracing::info!(hostname = %hostname, output = %output, "generating TLS certificate");

            let cert = SelfSignedCert::generate(&hostname)?;

            let cert_path = format!("{output}/stagecast.crt");
            let key_path = format!("{output}/stagecast.key");

            std::fs::write(&cert_path, &cert.cert_pem)?;
            std::fs::write(&key_path, &cert.key_pem)?;

            println!("Certificate: {cert_path}");
            println!("Private key: {key_path}");
            println!("Fingerprint: {}", cert.fingerprint);
        }
    }

    Ok(())
}
