use tokio::sync::mpsc;

use crate::transport::{FrameReceiver, FrameSender, Transport};

/// One end of an in-process connection.
pub struct InMemoryTransport {
    sender: InMemorySender,
    receiver: InMemoryReceiver,
}

pub struct InMemorySender {
    tx: Option<mpsc::UnboundedSender<String>>,
}

pub struct InMemoryReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

impl InMemoryTransport {
    pub fn pair() -> (Self, Self) {
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        (
            Self {
                sender: InMemorySender { tx: Some(tx1) },
                receiver: InMemoryReceiver { rx: rx2 },
            },
            Self {
                sender: InMemorySender { tx: Some(tx2) },
                receiver: InMemoryReceiver { rx: rx1 },
            },
        )
    }
}

impl Transport for InMemoryTransport {
    type Sender = InMemorySender;
    type Receiver = InMemoryReceiver;

    fn split(self) -> (Self::Sender, Self::Receiver) {
        (self.sender, self.receiver)
    }
}

#[async_trait::async_trait]
impl FrameSender for InMemorySender {
    async fn send(&mut self, frame: String) -> anyhow::Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Transport is shut down"))?;
        tx.send(frame)
            .map_err(|_| anyhow::anyhow!("Connection closed by peer"))
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.tx = None;
        Ok(())
    }
}

#[async_trait::async_trait]
impl FrameReceiver for InMemoryReceiver {
    async fn recv(&mut self) -> anyhow::Result<Option<String>> {
        Ok(self.rx.recv().await)
    }
}
