//! Client transports.
//!
//! Both transports carry the same JSON event envelopes: the plain TCP one
//! frames them as newline-delimited lines, the WebSocket one as one text
//! frame per event.

use futures_util::{SinkExt, StreamExt};
use presence_proto::{EventLineCodec, ProtocolError};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tokio_util::codec::Framed;

/// Error reading from or writing to a client transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

/// One inbound frame.
#[derive(Debug, PartialEq, Eq)]
pub enum Inbound {
    /// A text frame holding one JSON event.
    Text(String),
    /// A binary WebSocket frame of the given length. Never a valid event.
    Binary(usize),
}

/// A client transport.
pub enum Transport {
    /// Plain TCP, one event per line.
    Lines(Framed<TcpStream, EventLineCodec>),
    /// WebSocket, one event per text frame. Size limits are enforced by
    /// the stream's framing config.
    WebSocket(Box<WebSocketStream<TcpStream>>),
}

impl Transport {
    pub fn lines(stream: TcpStream, max_len: usize) -> Self {
        Self::Lines(Framed::new(stream, EventLineCodec::with_max_len(max_len)))
    }

    pub fn websocket(stream: WebSocketStream<TcpStream>) -> Self {
        Self::WebSocket(Box::new(stream))
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Lines(_) => "tcp",
            Self::WebSocket(_) => "websocket",
        }
    }

    /// Read the next frame. `Ok(None)` means the peer closed the connection.
    ///
    /// Cancel safe: no frame is lost if the future is dropped.
    pub async fn next_frame(&mut self) -> Result<Option<Inbound>, TransportError> {
        match self {
            Self::Lines(framed) => match framed.next().await {
                Some(Ok(line)) => Ok(Some(Inbound::Text(line))),
                Some(Err(e)) => Err(e.into()),
                None => Ok(None),
            },
            Self::WebSocket(stream) => loop {
                match stream.next().await {
                    Some(Ok(WsMessage::Text(text))) => return Ok(Some(Inbound::Text(text))),
                    Some(Ok(WsMessage::Binary(data))) => {
                        return Ok(Some(Inbound::Binary(data.len())));
                    }
                    Some(Ok(WsMessage::Close(_))) | None => return Ok(None),
                    // Pongs to pings are queued by tungstenite and flushed
                    // on the next read or write.
                    Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {
                        continue;
                    }
                    Some(Err(tungstenite::Error::ConnectionClosed)) => return Ok(None),
                    Some(Err(e)) => return Err(e.into()),
                }
            },
        }
    }

    /// Send one encoded event.
    pub async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        match self {
            Self::Lines(framed) => framed.send(text).await?,
            Self::WebSocket(stream) => stream.send(WsMessage::Text(text)).await?,
        }
        Ok(())
    }
}
