//! End-to-end tests: CLI client against a served gateway.
//!
//! Each test binds the gateway to an ephemeral port, talks to it through
//! the same `ApiClient` the `ephemera` binary uses, and shuts it down.

use ephemera_cli::client::{ApiClient, ClientError};
use ephemera_core::config::{Config, StorageBackend};
use ephemera_gateway::{Gateway, GatewayConfig};
use ephemera_secrets::{store, SecretService};
use tempfile::TempDir;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use url::Url;

struct Running {
    client: ApiClient,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<ephemera_gateway::Result<()>>,
}

impl Running {
    async fn shutdown(self) {
        self.stop.send(()).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

async fn serve(config: &Config) -> Running {
    let store = store::connect(&config.storage, &config.sqlite_path().unwrap())
        .await
        .unwrap();
    let service = SecretService::from_config(store, &config.secrets);
    let gateway = Gateway::new(GatewayConfig::from(&config.server), service);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    let (stop, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        gateway
            .serve(listener, async {
                let _ = stop_rx.await;
            })
            .await
    });

    Running {
        client: ApiClient::new(base),
        stop,
        handle,
    }
}

fn sqlite_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.backend = StorageBackend::Sqlite;
    config.storage.sqlite.path = Some(dir.path().join("ephemera.db"));
    config
}

#[tokio::test]
async fn test_views_run_out_over_http() {
    let dir = TempDir::new().unwrap();
    let running = serve(&sqlite_config(&dir)).await;

    let created = running.client.create("hello", 2).await.unwrap();
    let password = created.password.expose_secret().to_string();

    let first = running.client.lookup(&created.id, &password).await.unwrap();
    assert_eq!(first.text, "hello");
    assert_eq!(first.views, 1);

    let second = running.client.lookup(&created.id, &password).await.unwrap();
    assert_eq!(second.views, 0);

    assert!(matches!(
        running.client.lookup(&created.id, &password).await,
        Err(ClientError::NotFound)
    ));

    running.shutdown().await;
}

#[tokio::test]
async fn test_error_mapping_over_http() {
    let dir = TempDir::new().unwrap();
    let running = serve(&sqlite_config(&dir)).await;

    match running.client.create(&"x".repeat(101), 1).await {
        Err(ClientError::BadRequest(msg)) => assert_eq!(msg, "message too long"),
        other => panic!("expected bad request, got {:?}", other.map(|c| c.id)),
    }

    let created = running.client.create("hello", 1).await.unwrap();
    assert!(matches!(
        running.client.lookup(&created.id, "").await,
        Err(ClientError::Unauthorized)
    ));
    assert!(matches!(
        running
            .client
            .lookup(&created.id, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA")
            .await,
        Err(ClientError::Unauthorized)
    ));

    // Failed attempts do not consume views.
    let shown = running
        .client
        .lookup(&created.id, created.password.expose_secret())
        .await
        .unwrap();
    assert_eq!(shown.views, 0);

    running.shutdown().await;
}

#[tokio::test]
async fn test_sqlite_records_survive_restart() {
    let dir = TempDir::new().unwrap();
    let config = sqlite_config(&dir);

    let running = serve(&config).await;
    let created = running.client.create("persist me", 2).await.unwrap();
    running.shutdown().await;

    let running = serve(&config).await;
    let shown = running
        .client
        .lookup(&created.id, created.password.expose_secret())
        .await
        .unwrap();
    assert_eq!(shown.text, "persist me");
    assert_eq!(shown.views, 1);
    running.shutdown().await;
}

#[tokio::test]
async fn test_memory_backend_over_http() {
    let mut config = Config::default();
    config.storage.backend = StorageBackend::Memory;
    config.storage.sqlite.path = Some("unused.db".into());
    let running = serve(&config).await;

    let created = running.client.create("hi", 1).await.unwrap();
    let shown = running
        .client
        .lookup(&created.id, created.password.expose_secret())
        .await
        .unwrap();
    assert_eq!(shown.text, "hi");
    assert_eq!(shown.views, 0);

    running.shutdown().await;
}
