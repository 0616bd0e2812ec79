//! Network front end: accepts connections, runs one task per connection and a
//! single coordinator task that owns the `Match`.
//!
//! Connection tasks never touch match state. They forward every event as a
//! `Command` over one channel, and the coordinator applies commands strictly
//! in arrival order, each to completion.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::common::MatchError;
use crate::config::MatchConfig;
use crate::game::{Match, MatchPhase};
use crate::player::{Connection, ConnectionId, PlayerId};
use crate::protocol::ClientMessage;
use crate::transport::tcp::TcpTransport;
use crate::transport::websocket::WebSocketTransport;
use crate::transport::{FrameReceiver, FrameSender, FrameTooLarge, Transport, TransportKind};

/// Notice broadcast to players when the server stops.
pub const SHUTDOWN_NOTICE: &str = "Servidor encerrando.";

/// Events sent from connection tasks to the coordinator.
#[derive(Debug)]
pub enum Command {
    Connect {
        connection: Connection,
        reply: oneshot::Sender<Result<PlayerId, MatchError>>,
    },
    Message {
        conn: ConnectionId,
        msg: ClientMessage,
    },
    Malformed {
        conn: ConnectionId,
        error: MatchError,
    },
    Disconnect {
        conn: ConnectionId,
    },
    Announce {
        text: String,
    },
    Snapshot {
        reply: oneshot::Sender<MatchSnapshot>,
    },
}

/// Read-only view of the match, for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSnapshot {
    pub phase: MatchPhase,
    pub current_turn: usize,
    /// `(id, hits)` per seated player, in join order.
    pub players: Vec<(PlayerId, u32)>,
}

impl MatchSnapshot {
    fn of(game: &Match) -> Self {
        Self {
            phase: game.phase(),
            current_turn: game.current_turn(),
            players: game.players().iter().map(|p| (p.id, p.hits)).collect(),
        }
    }
}

/// Apply one command to the match.
pub fn apply(game: &mut Match, cmd: Command) {
    match cmd {
        Command::Connect { connection, reply } => {
            let result = game.admit(connection);
            let _ = reply.send(result);
        }
        Command::Message { conn, msg } => {
            // Rejections are already reported to the sender.
            let _ = game.handle(conn, msg);
        }
        Command::Malformed { conn, error } => {
            warn!("Malformed frame from {}: {}", conn, error);
            game.report(conn, &error);
        }
        Command::Disconnect { conn } => {
            game.disconnect(conn);
        }
        Command::Announce { text } => {
            let reached = game.announce(&text);
            debug!("Announcement delivered to {} players", reached);
        }
        Command::Snapshot { reply } => {
            let _ = reply.send(MatchSnapshot::of(game));
        }
    }
}

/// Drive `game` until every command sender is gone; returns the final state.
pub async fn run_coordinator(mut game: Match, mut commands: mpsc::UnboundedReceiver<Command>) -> Match {
    while let Some(cmd) = commands.recv().await {
        apply(&mut game, cmd);
    }
    debug!("Coordinator stopped");
    game
}

/// Cloneable entry point to the coordinator task.
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::UnboundedSender<Command>,
    next_conn: Arc<AtomicU64>,
}

impl CoordinatorHandle {
    fn dispatch(&self, cmd: Command) -> anyhow::Result<()> {
        self.commands
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Coordinator is not running"))
    }

    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_conn.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub async fn connect(&self, connection: Connection) -> anyhow::Result<Result<PlayerId, MatchError>> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::Connect { connection, reply })?;
        rx.await
            .map_err(|_| anyhow::anyhow!("Coordinator dropped the admission"))
    }

    pub fn message(&self, conn: ConnectionId, msg: ClientMessage) -> anyhow::Result<()> {
        self.dispatch(Command::Message { conn, msg })
    }

    pub fn malformed(&self, conn: ConnectionId, error: MatchError) -> anyhow::Result<()> {
        self.dispatch(Command::Malformed { conn, error })
    }

    pub fn disconnect(&self, conn: ConnectionId) -> anyhow::Result<()> {
        self.dispatch(Command::Disconnect { conn })
    }

    pub fn announce(&self, text: impl Into<String>) -> anyhow::Result<()> {
        self.dispatch(Command::Announce { text: text.into() })
    }

    /// Current state, observed after every command sent before this call.
    pub async fn snapshot(&self) -> anyhow::Result<MatchSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::Snapshot { reply })?;
        rx.await
            .map_err(|_| anyhow::anyhow!("Coordinator dropped the snapshot request"))
    }
}

/// Start a coordinator task for a fresh match.
pub fn spawn_coordinator(config: MatchConfig) -> (CoordinatorHandle, JoinHandle<Match>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_coordinator(Match::new(config), rx));
    let handle = CoordinatorHandle {
        commands: tx,
        next_conn: Arc::new(AtomicU64::new(0)),
    };
    (handle, task)
}

/// Run one connection from admission until it closes.
pub async fn serve_connection<T: Transport>(
    transport: T,
    coordinator: CoordinatorHandle,
) -> anyhow::Result<()> {
    let conn = coordinator.next_connection_id();
    let (mut sender, mut receiver) = transport.split();
    let (connection, mut outbox) = Connection::channel(conn);

    let admitted = coordinator.connect(connection).await?;

    // The coordinator holds the only handle to `outbox`, so the writer ends as
    // soon as the player is removed or the admission was refused.
    let writer = tokio::spawn(async move {
        while let Some(msg) = outbox.recv().await {
            let frame = msg.to_frame()?;
            sender.send(frame).await?;
        }
        sender.close().await
    });

    if let Err(err) = admitted {
        debug!("{} refused: {}", conn, err);
        return writer.await?;
    }

    loop {
        match receiver.recv().await {
            Ok(Some(frame)) => match ClientMessage::from_frame(&frame) {
                Ok(msg) => coordinator.message(conn, msg)?,
                Err(err) => coordinator.malformed(conn, err)?,
            },
            Ok(None) => {
                debug!("{} closed by peer", conn);
                break;
            }
            Err(e) => {
                match e.downcast_ref::<FrameTooLarge>() {
                    Some(too_large) => {
                        warn!("{} sent an oversized frame, closing", conn);
                        coordinator.malformed(conn, MatchError::Malformed(too_large.to_string()))?;
                    }
                    None => warn!("{} read failed: {}", conn, e),
                }
                break;
            }
        }
    }

    coordinator.disconnect(conn)?;
    match writer.await? {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!("{} writer ended with: {}", conn, e);
            Ok(())
        }
    }
}

/// A listening server for one match.
pub struct Server {
    listener: TcpListener,
    kind: TransportKind,
    coordinator: CoordinatorHandle,
    coordinator_task: JoinHandle<Match>,
}

impl Server {
    pub async fn bind<A: ToSocketAddrs>(
        addr: A,
        kind: TransportKind,
        config: MatchConfig,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let (coordinator, coordinator_task) = spawn_coordinator(config);
        info!(
            "Listening on {} ({:?}), win threshold {}",
            listener.local_addr()?,
            kind,
            config.win_threshold
        );
        Ok(Self {
            listener,
            kind,
            coordinator,
            coordinator_task,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn coordinator(&self) -> CoordinatorHandle {
        self.coordinator.clone()
    }

    /// Accept connections forever.
    pub async fn run(self) -> anyhow::Result<()> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Accept connections until `shutdown` resolves, then tell the players.
    pub async fn run_until<F: Future<Output = ()>>(self, shutdown: F) -> anyhow::Result<()> {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            debug!("Accepted connection from {}", addr);
                            tokio::spawn(handle_stream(stream, addr, self.kind, self.coordinator.clone()));
                        }
                        Err(e) => {
                            error!("Accept failed: {}", e);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutting down");
                    break;
                }
            }
        }

        self.coordinator.announce(SHUTDOWN_NOTICE)?;
        // The snapshot round trip guarantees the announcement has been queued.
        self.coordinator.snapshot().await?;
        // Give connection writers a moment to flush.
        tokio::time::sleep(Duration::from_millis(200)).await;
        self.coordinator_task.abort();
        Ok(())
    }
}

async fn handle_stream(
    stream: tokio::net::TcpStream,
    addr: SocketAddr,
    kind: TransportKind,
    coordinator: CoordinatorHandle,
) {
    let result = match kind {
        TransportKind::Ws => match WebSocketTransport::accept(stream).await {
            Ok(transport) => serve_connection(transport, coordinator).await,
            Err(e) => Err(e),
        },
        TransportKind::Tcp => serve_connection(TcpTransport::new(stream), coordinator).await,
    };
    if let Err(e) = result {
        warn!("Connection from {} ended with error: {}", addr, e);
    }
}
