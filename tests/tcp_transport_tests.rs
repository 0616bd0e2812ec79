use naval_match::{FrameReceiver, FrameSender, FrameTooLarge, TcpTransport, Transport};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

async fn socket_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (client, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
    (client.unwrap(), accepted.unwrap().0)
}

#[tokio::test]
async fn test_frames_are_newline_delimited() {
    let (a, b) = socket_pair().await;
    let (mut tx, _rx_a) = TcpTransport::new(a).split();
    let (_tx_b, mut rx) = TcpTransport::new(b).split();

    tx.send(r#"{"type":"start"}"#.to_string()).await.unwrap();
    tx.send(r#"{"type":"move","x":1,"y":2}"#.to_string()).await.unwrap();

    assert_eq!(rx.recv().await.unwrap().as_deref(), Some(r#"{"type":"start"}"#));
    assert_eq!(
        rx.recv().await.unwrap().as_deref(),
        Some(r#"{"type":"move","x":1,"y":2}"#)
    );
}

#[tokio::test]
async fn test_blank_lines_and_crlf_are_tolerated() {
    let (mut raw, b) = socket_pair().await;
    let (_tx, mut rx) = TcpTransport::new(b).split();

    raw.write_all(b"\r\n\n{\"type\":\"start\"}\r\n").await.unwrap();

    assert_eq!(rx.recv().await.unwrap().as_deref(), Some(r#"{"type":"start"}"#));
}

#[tokio::test]
async fn test_close_ends_peer_stream() {
    let (a, b) = socket_pair().await;
    let (mut tx, _rx_a) = TcpTransport::new(a).split();
    let (_tx_b, mut rx) = TcpTransport::new(b).split();

    tx.send("hello".to_string()).await.unwrap();
    tx.close().await.unwrap();
    tx.close().await.unwrap();

    assert_eq!(rx.recv().await.unwrap().as_deref(), Some("hello"));
    assert_eq!(rx.recv().await.unwrap(), None);
    assert!(tx.send("late".to_string()).await.is_err());
}

#[tokio::test]
async fn test_oversized_frame_is_an_error() {
    let (mut raw, b) = socket_pair().await;
    let (_tx, mut rx) = TcpTransport::with_max_frame_size(b, 16).split();

    let mut data = vec![b'a'; 64];
    data.push(b'\n');
    raw.write_all(&data).await.unwrap();

    let err = rx.recv().await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<FrameTooLarge>(),
        Some(&FrameTooLarge { limit: 16 })
    );
}

#[tokio::test]
async fn test_frame_at_the_limit_is_accepted() {
    let (mut raw, b) = socket_pair().await;
    let (_tx, mut rx) = TcpTransport::with_max_frame_size(b, 16).split();

    raw.write_all(b"0123456789abcdef\n").await.unwrap();

    assert_eq!(rx.recv().await.unwrap().as_deref(), Some("0123456789abcdef"));
}

#[tokio::test]
async fn test_line_breaks_inside_frames_are_refused() {
    let (a, _b) = socket_pair().await;
    let (mut tx, _rx) = TcpTransport::new(a).split();
    assert!(tx.send("one\ntwo".to_string()).await.is_err());
}
