//! Headless client that plays a match on its own: it submits a random fleet
//! and fires at untried cells whenever it holds the turn.

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::board::Board;
use crate::config::{BOARD_SIZE, WIN_THRESHOLD};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::transport::{FrameReceiver, FrameSender};

/// How a bot's match ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotOutcome {
    Won,
    Lost,
    /// The other player disconnected before anyone won.
    OpponentLeft,
    /// The server refused the connection with the given notice.
    Rejected(String),
    /// The server closed the connection.
    Closed,
}

pub struct Bot {
    board: Board,
    targets: Vec<(usize, usize)>,
    seated: bool,
    awaiting_result: bool,
    shots: usize,
    hits: usize,
    /// Hits that decide the match; no shot is fired past it.
    win_threshold: usize,
}

impl Bot {
    /// A bot with a random fleet and a random firing order.
    pub fn new(rng: &mut SmallRng) -> anyhow::Result<Self> {
        let board = Board::random_fleet(rng).map_err(|e| anyhow::anyhow!(e))?;
        let mut targets: Vec<(usize, usize)> = (0..BOARD_SIZE)
            .flat_map(|y| (0..BOARD_SIZE).map(move |x| (x, y)))
            .collect();
        targets.shuffle(rng);
        Ok(Self {
            board,
            targets,
            seated: false,
            awaiting_result: false,
            shots: 0,
            hits: 0,
            win_threshold: WIN_THRESHOLD as usize,
        })
    }

    /// Expect the server to end the match after `threshold` hits.
    pub fn with_win_threshold(mut self, threshold: u32) -> Self {
        self.win_threshold = threshold as usize;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn shots_fired(&self) -> usize {
        self.shots
    }

    pub fn hits_landed(&self) -> usize {
        self.hits
    }

    async fn fire<S: FrameSender + ?Sized>(&mut self, sender: &mut S) -> anyhow::Result<()> {
        let (x, y) = self
            .targets
            .pop()
            .ok_or_else(|| anyhow::anyhow!("No untried cells left to fire at"))?;
        sender.send(ClientMessage::Move { x, y }.to_frame()?).await?;
        self.shots += 1;
        self.awaiting_result = true;
        Ok(())
    }

    /// Play until the match is decided or the connection ends.
    pub async fn play<S, R>(&mut self, sender: &mut S, receiver: &mut R) -> anyhow::Result<BotOutcome>
    where
        S: FrameSender + ?Sized,
        R: FrameReceiver + ?Sized,
    {
        sender.send(ClientMessage::Start.to_frame()?).await?;
        sender
            .send(ClientMessage::SetBoard { board: self.board }.to_frame()?)
            .await?;
        sender.send(ClientMessage::ConfirmShips.to_frame()?).await?;

        while let Some(frame) = receiver.recv().await? {
            let msg = match ServerMessage::from_frame(&frame) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!("Ignoring unreadable server frame: {}", e);
                    continue;
                }
            };
            match msg {
                ServerMessage::Error { message } => {
                    if !self.seated {
                        return Ok(BotOutcome::Rejected(message));
                    }
                    warn!("Server rejected a message: {}", message);
                    self.awaiting_result = false;
                }
                ServerMessage::Info { message } => {
                    if self.seated {
                        info!("{}", message);
                        return Ok(BotOutcome::OpponentLeft);
                    }
                    debug!("{}", message);
                    self.seated = true;
                }
                ServerMessage::Start { message } | ServerMessage::Broadcast { message } => {
                    info!("{}", message);
                }
                ServerMessage::Turn { .. } => self.fire(sender).await?,
                ServerMessage::Hit { x, y, player } => {
                    if self.awaiting_result {
                        self.hits += 1;
                        debug!("Hit at ({}, {}) as player {}", x, y, player);
                        // The winning hit is followed by `win`; stay put until it arrives.
                        if self.hits < self.win_threshold {
                            self.fire(sender).await?;
                        }
                    }
                }
                ServerMessage::Miss { .. } => {
                    self.awaiting_result = false;
                }
                ServerMessage::Win { message } => {
                    info!("{}", message);
                    return Ok(if self.awaiting_result {
                        BotOutcome::Won
                    } else {
                        BotOutcome::Lost
                    });
                }
            }
        }
        Ok(BotOutcome::Closed)
    }
}
