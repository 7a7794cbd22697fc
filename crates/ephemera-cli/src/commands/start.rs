//! Server launcher.

use clap::Args;
use ephemera_core::config::{BindMode, Config, StorageBackend};
use ephemera_gateway::{Gateway, GatewayConfig};
use ephemera_secrets::{store, SecretService};
use std::path::PathBuf;
use tracing::info;

/// Start command arguments. Each flag overrides the config file.
#[derive(Args)]
pub struct StartArgs {
    /// Bind mode (loopback, lan)
    #[arg(short, long)]
    pub bind: Option<BindMode>,

    /// Port number
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Storage backend (sqlite, consul, memory)
    #[arg(long)]
    pub backend: Option<StorageBackend>,

    /// SQLite database file
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Consul agent address
    #[arg(long)]
    pub consul_address: Option<String>,

    /// Consul ACL token
    #[arg(long)]
    pub consul_token: Option<String>,

    /// Storage namespace
    #[arg(long)]
    pub namespace: Option<String>,
}

impl StartArgs {
    /// Layer command-line flags on top of `config`.
    pub fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(backend) = self.backend {
            config.storage.backend = backend;
        }
        if let Some(path) = self.db_path {
            config.storage.sqlite.path = Some(path);
        }
        if let Some(address) = self.consul_address {
            config.storage.consul.address = address;
        }
        if let Some(token) = self.consul_token {
            config.storage.consul.token = Some(token);
        }
        if let Some(namespace) = self.namespace {
            config.storage.namespace = namespace;
        }
    }
}

/// Run the start command.
pub async fn run(args: StartArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let sqlite_path = config.sqlite_path()?;
    let store = store::connect(&config.storage, &sqlite_path).await?;
    let service = SecretService::from_config(store, &config.secrets);

    info!(
        backend = config.storage.backend.as_str(),
        accounting = ?config.secrets.view_accounting,
        "secret service configured"
    );

    let gateway = Gateway::new(GatewayConfig::from(&config.server), service);
    gateway.run().await?;

    Ok(())
}
