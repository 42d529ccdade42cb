//! Test server management.
//!
//! Spawns and manages presenced instances for integration testing.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Listener layout and policy for a test server.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// Plain TCP (JSON lines) port.
    pub tcp_port: Option<u16>,
    /// WebSocket port.
    pub ws_port: Option<u16>,
    /// WebSocket origin allow-list.
    pub allow_origins: Vec<String>,
    /// Require senderId to match the announced identity.
    pub bind_sender_identity: bool,
    /// Per-connection sustained inbound rate.
    pub events_per_second: Option<u32>,
    /// Per-connection inbound burst.
    pub event_burst: Option<u32>,
    /// Maximum inbound frame size in bytes.
    pub max_event_bytes: Option<usize>,
}

#[allow(dead_code)]
impl ServerOptions {
    pub fn tcp(port: u16) -> Self {
        Self {
            tcp_port: Some(port),
            ..Self::default()
        }
    }

    pub fn websocket(port: u16) -> Self {
        Self {
            ws_port: Some(port),
            ..Self::default()
        }
    }

    fn to_toml(&self) -> String {
        let mut config = String::from(
            r#"
[server]
name = "test.relay"
node_id = "T01"
metrics_port = 0

[routing]
"#,
        );
        config.push_str(&format!(
            "bind_sender_identity = {}\n\n[limits]\nevents_per_second = {}\nevent_burst = {}\n",
            self.bind_sender_identity,
            self.events_per_second.unwrap_or(1000),
            self.event_burst.unwrap_or(1000),
        ));
        if let Some(max) = self.max_event_bytes {
            config.push_str(&format!("max_event_bytes = {}\n", max));
        }
        if let Some(port) = self.tcp_port {
            config.push_str(&format!("\n[listen]\naddress = \"127.0.0.1:{}\"\n", port));
        }
        if let Some(port) = self.ws_port {
            let origins: Vec<String> = self
                .allow_origins
                .iter()
                .map(|o| format!("\"{}\"", o))
                .collect();
            config.push_str(&format!(
                "\n[websocket]\naddress = \"127.0.0.1:{}\"\nallow_origins = [{}]\n",
                port,
                origins.join(", ")
            ));
        }
        config
    }
}

/// A test server instance.
pub struct TestServer {
    child: Child,
    options: ServerOptions,
    _data_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Spawn a server with a single TCP listener.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with(ServerOptions::tcp(port)).await
    }

    /// Spawn a server with the given options.
    pub async fn spawn_with(options: ServerOptions) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let config_path = data_dir.path().join("config.toml");
        std::fs::write(&config_path, options.to_toml())?;

        let binary_path = PathBuf::from(env!("CARGO_BIN_EXE_presenced"));
        let child = Command::new(&binary_path)
            .arg(&config_path)
            .stdout(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            options,
            _data_dir: data_dir,
        };

        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until every configured listener accepts connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        let ports: Vec<u16> = [self.options.tcp_port, self.options.ws_port]
            .into_iter()
            .flatten()
            .collect();

        for _ in 0..30 {
            let mut ready = true;
            for &port in &ports {
                if tokio::net::TcpStream::connect(("127.0.0.1", port)).await.is_err() {
                    ready = false;
                    break;
                }
            }
            if ready {
                // Let the probe connections' disconnects drain before any
                // test client attaches.
                sleep(Duration::from_millis(100)).await;
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 3 seconds")
    }

    /// Address of the TCP listener.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.options.tcp_port.unwrap_or_default())
    }

    /// URL of the WebSocket listener.
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/", self.options.ws_port.unwrap_or_default())
    }

    /// Create a new TCP test client connected to this server.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }

    /// Create a new WebSocket test client connected to this server.
    pub async fn connect_ws(&self) -> anyhow::Result<super::ws::WsClient> {
        super::ws::WsClient::connect(&self.ws_url(), None).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
