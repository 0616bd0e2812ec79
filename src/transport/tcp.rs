use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::config::MAX_FRAME_SIZE;
use crate::transport::{FrameReceiver, FrameSender, FrameTooLarge, Transport};

/// Newline-delimited JSON over a plain TCP stream.
pub struct TcpTransport {
    stream: TcpStream,
    max_frame_size: usize,
}

pub struct TcpSender {
    writer: OwnedWriteHalf,
    closed: bool,
}

pub struct TcpReceiver {
    reader: BufReader<OwnedReadHalf>,
    max_frame_size: usize,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_max_frame_size(stream, MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(stream: TcpStream, max_frame_size: usize) -> Self {
        Self {
            stream,
            max_frame_size,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }
}

impl Transport for TcpTransport {
    type Sender = TcpSender;
    type Receiver = TcpReceiver;

    fn split(self) -> (Self::Sender, Self::Receiver) {
        let (read, write) = self.stream.into_split();
        (
            TcpSender {
                writer: write,
                closed: false,
            },
            TcpReceiver {
                reader: BufReader::new(read),
                max_frame_size: self.max_frame_size,
            },
        )
    }
}

fn io_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset => {
            anyhow::anyhow!("Connection closed by peer")
        }
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

#[async_trait::async_trait]
impl FrameSender for TcpSender {
    async fn send(&mut self, frame: String) -> anyhow::Result<()> {
        if self.closed {
            return Err(anyhow::anyhow!("Transport is shut down"));
        }
        if frame.contains('\n') {
            return Err(anyhow::anyhow!("Frame contains a line break"));
        }
        let mut data = frame.into_bytes();
        data.push(b'\n');
        self.writer.write_all(&data).await.map_err(io_error)?;
        self.writer.flush().await.map_err(io_error)
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.writer.shutdown().await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(io_error(e)),
        }
    }
}

#[async_trait::async_trait]
impl FrameReceiver for TcpReceiver {
    async fn recv(&mut self) -> anyhow::Result<Option<String>> {
        loop {
            let mut line = String::new();
            // One byte over the cap tells an oversized frame from one that fits exactly.
            let limit = self.max_frame_size as u64 + 2;
            let read = match (&mut self.reader).take(limit).read_line(&mut line).await {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => return Ok(None),
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    return Err(anyhow::anyhow!("Frame is not valid UTF-8"))
                }
                Err(e) => return Err(io_error(e)),
            };
            if read == 0 {
                return Ok(None);
            }
            let frame = line.trim_end_matches(['\r', '\n']);
            if frame.len() > self.max_frame_size {
                return Err(FrameTooLarge {
                    limit: self.max_frame_size,
                }
                .into());
            }
            if !line.ends_with('\n') {
                // Peer closed mid-line; the partial frame is still delivered.
                if frame.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(frame.to_string()));
            }
            if frame.trim().is_empty() {
                continue;
            }
            return Ok(Some(frame.to_string()));
        }
    }
}
