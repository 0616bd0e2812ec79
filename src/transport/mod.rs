//! Duplex channels of UTF-8 text frames, one JSON message per frame.
//!
//! A transport is split into an outbound and an inbound half so a connection
//! can write queued messages while it waits for the next client frame.

/// Outbound half of a connection.
#[async_trait::async_trait]
pub trait FrameSender: Send {
    async fn send(&mut self, frame: String) -> anyhow::Result<()>;
    /// Hang up. Closing an already closed connection is not an error.
    async fn close(&mut self) -> anyhow::Result<()>;
}

/// Inbound half of a connection.
#[async_trait::async_trait]
pub trait FrameReceiver: Send {
    /// Next frame, or `None` once the peer has closed the connection.
    async fn recv(&mut self) -> anyhow::Result<Option<String>>;
}

/// A client frame exceeded the transport's size cap. The connection cannot be
/// resynchronized and is closed after the sender is told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTooLarge {
    pub limit: usize,
}

impl core::fmt::Display for FrameTooLarge {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "frame larger than {} bytes", self.limit)
    }
}

impl std::error::Error for FrameTooLarge {}

pub trait Transport: Send + 'static {
    type Sender: FrameSender + 'static;
    type Receiver: FrameReceiver + 'static;

    fn split(self) -> (Self::Sender, Self::Receiver);
}

/// Wire format a server listens with.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportKind {
    /// WebSocket text frames, as spoken by browsers.
    #[default]
    Ws,
    /// Newline-delimited JSON over plain TCP.
    Tcp,
}

pub mod in_memory;
pub mod tcp;
pub mod websocket;
