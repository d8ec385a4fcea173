//! # Chain-Front
//!
//! Sidecar security gateway for a blockchain node.
//!
//! ```text
//! chain-front [--config PATH] [serve]
//! chain-front add-node --address ADDR --admin ADMIN
//! chain-front get-cert
//! chain-front get-revoke-list [--since SERIAL]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use fr_01_revocation::{load_signer, CaOperations, GrpcCaClient};
use front_runtime::{FrontConfig, FrontContext, FrontServer, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "chain-front")]
#[command(about = "mTLS security gateway in front of a blockchain node")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the gateway (default)
    Serve,
    /// Ask the CA to enroll a node into this network
    AddNode {
        #[arg(long)]
        address: String,
        #[arg(long)]
        admin: String,
    },
    /// Fetch this node's certificate and write it to the TLS directory
    GetCert,
    /// Print the CA's revocation list
    GetRevokeList {
        /// Only entries after this serial
        #[arg(long, default_value = "")]
        since: String,
    },
}

fn load_config(path: &Path) -> Result<FrontConfig> {
    let config = if path.exists() {
        FrontConfig::load(path)?
    } else {
        FrontConfig::default()
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

fn ca_operations(config: &FrontConfig) -> Result<CaOperations> {
    let signer = load_signer(&config.keys_path)
        .with_context(|| format!("failed to load node key from {}", config.keys_path.display()))?;
    Ok(CaOperations::new(
        Arc::new(GrpcCaClient::new(config.ca.host.clone())),
        signer,
    ))
}

async fn serve(config: FrontConfig) -> Result<()> {
    info!("===========================================");
    info!("  Chain-Front v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let context = Arc::new(FrontContext::build(config)?);
    let server = FrontServer::start(context).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    server.stop().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;

    front_telemetry::init_logging(&config.log.clone().with_env_overrides())?;
    if !args.config.exists() {
        info!("[runtime] {} not found, using defaults", args.config.display());
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::AddNode { address, admin } => {
            let response = ca_operations(&config)?
                .enroll_node(&address, &config.net_name, &admin)
                .await?;
            println!("enrolled {} (log id {})", address, response.log_id);
            Ok(())
        }
        Command::GetCert => {
            let written = ca_operations(&config)?
                .fetch_and_write_cert(&config.net_name, &config.server.tls_path)
                .await?;
            if written {
                println!("certificate written to {}", config.server.tls_path.display());
            } else {
                println!("certificate already present in {}", config.server.tls_path.display());
            }
            Ok(())
        }
        Command::GetRevokeList { since } => {
            let records = ca_operations(&config)?
                .revoke_list(&config.net_name, &since)
                .await?;
            for record in &records {
                println!("{}\t{}\t{}", record.id, record.serial_number, record.revoked_at);
            }
            println!("{} revoked certificate(s)", records.len());
            Ok(())
        }
    }
}
