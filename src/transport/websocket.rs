use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::config::MAX_FRAME_SIZE;
use crate::transport::{FrameReceiver, FrameSender, FrameTooLarge, Transport};

/// WebSocket connection carrying one JSON message per text frame.
pub struct WebSocketTransport<S> {
    stream: WebSocketStream<S>,
}

pub struct WebSocketSender<S> {
    sink: SplitSink<WebSocketStream<S>, Message>,
    closed: bool,
}

pub struct WebSocketReceiver<S> {
    stream: SplitStream<WebSocketStream<S>>,
}

fn server_config() -> WebSocketConfig {
    let mut config = WebSocketConfig::default();
    config.max_message_size = Some(MAX_FRAME_SIZE);
    config.max_frame_size = Some(MAX_FRAME_SIZE);
    config
}

impl WebSocketTransport<TcpStream> {
    /// Complete the server side of the opening handshake.
    pub async fn accept(stream: TcpStream) -> anyhow::Result<Self> {
        let stream = tokio_tungstenite::accept_async_with_config(stream, Some(server_config()))
            .await
            .map_err(|e| anyhow::anyhow!("WebSocket handshake failed: {}", e))?;
        Ok(Self { stream })
    }
}

impl WebSocketTransport<MaybeTlsStream<TcpStream>> {
    /// Connect to `url`, e.g. `ws://127.0.0.1:3000`.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| anyhow::anyhow!("WebSocket connect to {} failed: {}", url, e))?;
        Ok(Self { stream })
    }
}

impl<S> WebSocketTransport<S> {
    pub fn from_stream(stream: WebSocketStream<S>) -> Self {
        Self { stream }
    }
}

impl<S> Transport for WebSocketTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Sender = WebSocketSender<S>;
    type Receiver = WebSocketReceiver<S>;

    fn split(self) -> (Self::Sender, Self::Receiver) {
        let (sink, stream) = self.stream.split();
        (
            WebSocketSender {
                sink,
                closed: false,
            },
            WebSocketReceiver { stream },
        )
    }
}

#[async_trait::async_trait]
impl<S> FrameSender for WebSocketSender<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, frame: String) -> anyhow::Result<()> {
        if self.closed {
            return Err(anyhow::anyhow!("Transport is shut down"));
        }
        self.sink.send(Message::Text(frame)).await.map_err(|e| match e {
            WsError::ConnectionClosed | WsError::AlreadyClosed => {
                anyhow::anyhow!("Connection closed by peer")
            }
            other => anyhow::anyhow!("WebSocket write error: {}", other),
        })
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.sink.close().await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(anyhow::anyhow!("WebSocket close error: {}", e)),
        }
    }
}

#[async_trait::async_trait]
impl<S> FrameReceiver for WebSocketReceiver<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> anyhow::Result<Option<String>> {
        while let Some(msg) = self.stream.next().await {
            match msg {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Binary(data)) => {
                    let text = String::from_utf8(data)
                        .map_err(|_| anyhow::anyhow!("Binary frame is not valid UTF-8"))?;
                    return Ok(Some(text));
                }
                Ok(Message::Close(_)) => return Ok(None),
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => continue,
                Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => return Ok(None),
                Err(WsError::Protocol(_)) => return Ok(None),
                Err(WsError::Capacity(_)) => {
                    return Err(FrameTooLarge {
                        limit: MAX_FRAME_SIZE,
                    }
                    .into())
                }
                Err(e) => return Err(anyhow::anyhow!("WebSocket read error: {}", e)),
            }
        }
        Ok(None)
    }
}
