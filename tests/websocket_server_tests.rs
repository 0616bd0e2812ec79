use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use naval_match::{
    ClientMessage, MatchConfig, PlayerId, Server, ServerMessage, TcpTransport, TransportKind,
    FrameReceiver, FrameSender, Transport, SHUTDOWN_NOTICE,
};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start(kind: TransportKind) -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<anyhow::Result<()>>) {
    let server = Server::bind("127.0.0.1:0", kind, MatchConfig::default())
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(server.run_until(async move {
        let _ = stopped.await;
    }));
    (addr, stop, task)
}

async fn ws_connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
    client
}

async fn next(client: &mut Client) -> Option<ServerMessage> {
    loop {
        let msg = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for the server")?;
        match msg {
            Ok(Message::Text(text)) => return Some(ServerMessage::from_frame(&text).unwrap()),
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

async fn send(client: &mut Client, msg: ClientMessage) {
    client
        .send(Message::Text(msg.to_frame().unwrap()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_browser_clients_play_over_websocket() {
    let (addr, _stop, _task) = start(TransportKind::Ws).await;

    let mut p1 = ws_connect(addr).await;
    assert_eq!(next(&mut p1).await, Some(ServerMessage::joined(PlayerId(1))));
    let mut p2 = ws_connect(addr).await;
    assert_eq!(next(&mut p2).await, Some(ServerMessage::joined(PlayerId(2))));

    assert_eq!(next(&mut p1).await, Some(ServerMessage::started()));
    assert_eq!(next(&mut p1).await, Some(ServerMessage::your_turn()));
    assert_eq!(next(&mut p2).await, Some(ServerMessage::started()));

    // A browser sends the board as raw JSON arrays.
    let mut rows = vec![vec![0u8; 10]; 10];
    rows[4][3] = 1;
    let frame = serde_json::json!({"type": "setBoard", "board": rows}).to_string();
    p2.send(Message::Text(frame)).await.unwrap();

    send(&mut p1, ClientMessage::Move { x: 3, y: 4 }).await;
    let hit = ServerMessage::Hit {
        x: 3,
        y: 4,
        player: PlayerId(1),
    };
    assert_eq!(next(&mut p1).await, Some(hit.clone()));
    assert_eq!(next(&mut p2).await, Some(hit));

    p1.send(Message::Text("garbage".to_string())).await.unwrap();
    assert!(matches!(next(&mut p1).await, Some(ServerMessage::Error { .. })));
}

#[tokio::test]
async fn test_third_websocket_client_is_turned_away() {
    let (addr, _stop, _task) = start(TransportKind::Ws).await;
    let mut p1 = ws_connect(addr).await;
    next(&mut p1).await;
    let mut p2 = ws_connect(addr).await;
    next(&mut p2).await;

    let mut p3 = ws_connect(addr).await;
    assert_eq!(
        next(&mut p3).await,
        Some(ServerMessage::Error {
            message: "O jogo já está em andamento.".to_string()
        })
    );
    assert_eq!(next(&mut p3).await, None);
}

#[tokio::test]
async fn test_shutdown_is_announced() {
    let (addr, stop, task) = start(TransportKind::Ws).await;
    let mut p1 = ws_connect(addr).await;
    assert_eq!(next(&mut p1).await, Some(ServerMessage::joined(PlayerId(1))));

    stop.send(()).unwrap();

    assert_eq!(
        next(&mut p1).await,
        Some(ServerMessage::announcement(SHUTDOWN_NOTICE))
    );
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_tcp_server_speaks_json_lines() {
    let (addr, _stop, _task) = start(TransportKind::Tcp).await;
    let (mut tx, mut rx) = TcpTransport::connect(addr).await.unwrap().split();

    let greeting = rx.recv().await.unwrap().unwrap();
    assert_eq!(
        ServerMessage::from_frame(&greeting).unwrap(),
        ServerMessage::joined(PlayerId(1))
    );

    tx.send(ClientMessage::Move { x: 0, y: 0 }.to_frame().unwrap())
        .await
        .unwrap();
    let reply = rx.recv().await.unwrap().unwrap();
    assert_eq!(
        ServerMessage::from_frame(&reply).unwrap(),
        ServerMessage::Error {
            message: "O jogo ainda não começou.".to_string()
        }
    );
}
