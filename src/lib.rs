mod board;
pub mod bot;
mod common;
mod config;
mod game;
mod logging;
mod player;
pub mod protocol;
pub mod server;
pub mod transport;

pub use board::*;
pub use bot::{Bot, BotOutcome};
pub use common::*;
pub use config::*;
pub use game::*;
pub use logging::{init_logging, parse_level, LOG_ENV};
pub use player::*;
pub use protocol::*;
pub use server::{
    serve_connection, spawn_coordinator, CoordinatorHandle, MatchSnapshot, Server,
    SHUTDOWN_NOTICE,
};
pub use transport::in_memory::InMemoryTransport;
pub use transport::tcp::TcpTransport;
pub use transport::websocket::WebSocketTransport;
pub use transport::{FrameReceiver, FrameSender, FrameTooLarge, Transport, TransportKind};
