//! Test WebSocket client.

use futures_util::{SinkExt, StreamExt};
use presence_proto::{ClientEvent, ServerEvent, decode_server_event, encode_client_event};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// A test WebSocket client, one JSON event per text frame.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[allow(dead_code)]
impl WsClient {
    /// Connect, optionally presenting an Origin header.
    pub async fn connect(url: &str, origin: Option<&str>) -> anyhow::Result<Self> {
        let mut request = url.into_client_request()?;
        if let Some(origin) = origin {
            request.headers_mut().insert("Origin", origin.parse()?);
        }
        let (stream, _response) = connect_async(request).await?;
        Ok(Self { stream })
    }

    pub async fn send(&mut self, event: &ClientEvent) -> anyhow::Result<()> {
        let text = encode_client_event(event)?;
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    pub async fn send_message(&mut self, message: Message) -> anyhow::Result<()> {
        self.stream.send(message).await?;
        Ok(())
    }

    /// Receive the next event, skipping control frames.
    pub async fn recv(&mut self) -> anyhow::Result<ServerEvent> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<ServerEvent> {
        loop {
            match timeout(dur, self.stream.next()).await? {
                Some(Ok(Message::Text(text))) => return Ok(decode_server_event(&text)?),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(other)) => anyhow::bail!("unexpected frame {:?}", other),
                Some(Err(e)) => return Err(e.into()),
                None => anyhow::bail!("connection closed by server"),
            }
        }
    }

    /// Receive the next raw frame.
    pub async fn recv_frame(&mut self, dur: Duration) -> anyhow::Result<Option<Message>> {
        match timeout(dur, self.stream.next()).await? {
            Some(frame) => Ok(Some(frame?)),
            None => Ok(None),
        }
    }

    pub async fn close(mut self) -> anyhow::Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
