//! DRRMI - interactive tag deletion for Docker-compatible registries.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use drrmi_registry::{RegistryAuth, RegistryClient, RegistryConfig, TrustConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

mod complete;
mod session;
mod shell;

const INTRO: &str = "\
Docker Registry rmi: interactively delete tags from a registry.
The registry must run with storage.delete.enabled: true. Deleting a tag
only drops its manifest reference; run the registry garbage collector
afterwards to reclaim disk space.";

/// Interactive tag deleter for Docker-compatible registries.
#[derive(Parser)]
#[command(name = "drrmi")]
#[command(author, version, about = INTRO)]
struct Cli {
    /// Registry host (host or host:port)
    #[arg(long)]
    host: String,

    /// Username (with --password; otherwise the pass store is consulted)
    #[arg(long, requires = "password")]
    username: Option<String>,

    /// Password (with --username)
    #[arg(long, requires = "username")]
    password: Option<String>,

    /// CA bundle path (default: /etc/docker/certs.d/{host}/ca.crt)
    #[arg(long)]
    ca_path: Option<PathBuf>,

    /// Verify certificates against the system roots, ignoring any CA path
    #[arg(long, conflicts_with = "no_verify")]
    verify: bool,

    /// Disable certificate verification
    #[arg(long)]
    no_verify: bool,

    /// Credential store consulted when no explicit credentials are given
    #[arg(long, default_value = "pass")]
    pass_store: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
}

impl Cli {
    /// Tri-state verification override: flags win over any CA path.
    fn verify_flag(&self) -> Option<bool> {
        if self.verify {
            Some(true)
        } else if self.no_verify {
            Some(false)
        } else {
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drrmi=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let verify = cli.verify_flag();

    let url = format!("https://{}", cli.host);
    let _ = Url::parse(&url).with_context(|| format!("invalid registry host: {}", cli.host))?;

    // Missing credentials are fatal: no request can be authenticated.
    let credential = drrmi_registry::resolve_credential(
        &cli.host,
        cli.username,
        cli.password,
        &cli.pass_store,
    )
    .context("failed to resolve registry credentials")?;

    let trust = TrustConfig::resolve(&cli.host, verify, cli.ca_path);

    let config = RegistryConfig::new(url)
        .with_auth(RegistryAuth::basic(credential.username, credential.password))
        .with_trust(trust)
        .with_timeout(Duration::from_secs(cli.timeout));
    let client = RegistryClient::new(config).context("failed to build registry client")?;

    println!("{INTRO}");
    shell::run(client).await
}
