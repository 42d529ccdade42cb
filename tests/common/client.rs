//! Test TCP client.
//!
//! Speaks newline-delimited JSON events and asserts on what comes back.

use presence_proto::{
    ClientEvent, PresenceEntry, ServerEvent, decode_server_event, encode_client_event,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test JSON-lines client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

#[allow(dead_code)]
impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Send a raw line (a newline is appended when missing).
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send a client event.
    pub async fn send(&mut self, event: &ClientEvent) -> anyhow::Result<()> {
        let line = encode_client_event(event)?;
        self.send_raw(&line).await
    }

    pub async fn add_user(&mut self, user_id: &str) -> anyhow::Result<()> {
        self.send(&ClientEvent::add_user(user_id)).await
    }

    pub async fn send_message(&mut self, from: &str, to: &str, text: &str) -> anyhow::Result<()> {
        self.send(&ClientEvent::send_message(from, to, text)).await
    }

    /// Receive a single event.
    pub async fn recv(&mut self) -> anyhow::Result<ServerEvent> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive an event with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<ServerEvent> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("connection closed by server");
        }
        Ok(decode_server_event(line.trim_end())?)
    }

    /// Receive the next presence snapshot, failing on any other event.
    pub async fn recv_presence(&mut self) -> anyhow::Result<Vec<PresenceEntry>> {
        match self.recv().await? {
            ServerEvent::GetUsers(entries) => Ok(entries),
            other => anyhow::bail!("expected getUsers, got {:?}", other),
        }
    }

    /// Receive events until the predicate matches, returning all of them.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<ServerEvent>>
    where
        F: FnMut(&ServerEvent) -> bool,
    {
        let mut events = Vec::new();
        loop {
            let event = self.recv().await?;
            let done = predicate(&event);
            events.push(event);
            if done {
                return Ok(events);
            }
        }
    }

    /// Assert nothing arrives within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) {
        if let Ok(event) = self.recv_timeout(dur).await {
            panic!("expected no event, got {:?}", event);
        }
    }

    /// Whether the server has closed this connection.
    pub async fn is_closed(&mut self, dur: Duration) -> bool {
        let mut line = String::new();
        loop {
            line.clear();
            match timeout(dur, self.reader.read_line(&mut line)).await {
                Ok(Ok(0)) | Ok(Err(_)) => return true,
                Ok(Ok(_)) => continue,
                Err(_) => return false,
            }
        }
    }
}
