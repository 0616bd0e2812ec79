use naval_match::{Board, Cell, ClientMessage, MatchError, PlayerId, ServerMessage};
use serde_json::{json, Value};

fn as_json(msg: &ServerMessage) -> Value {
    serde_json::from_str(&msg.to_frame().unwrap()).unwrap()
}

#[test]
fn test_server_messages_use_type_tag() {
    assert_eq!(
        as_json(&ServerMessage::error(&MatchError::OutOfTurn)),
        json!({"type": "error", "message": "Não é seu turno!"})
    );
    assert_eq!(
        as_json(&ServerMessage::joined(PlayerId(2))),
        json!({"type": "info", "message": "Você entrou no jogo como Jogador 2"})
    );
    assert_eq!(
        as_json(&ServerMessage::started()),
        json!({"type": "start", "message": "O jogo começou!"})
    );
    assert_eq!(
        as_json(&ServerMessage::your_turn()),
        json!({"type": "turn", "message": "Sua vez de jogar!"})
    );
    assert_eq!(
        as_json(&ServerMessage::winner(PlayerId(1))),
        json!({"type": "win", "message": "Jogador 1 venceu!"})
    );
    assert_eq!(
        as_json(&ServerMessage::announcement("olá")),
        json!({"type": "broadcast", "message": "olá"})
    );
}

#[test]
fn test_shot_events_carry_coordinates_and_player() {
    let hit = ServerMessage::Hit {
        x: 3,
        y: 4,
        player: PlayerId(1),
    };
    let miss = ServerMessage::Miss {
        x: 0,
        y: 9,
        player: PlayerId(2),
    };
    assert_eq!(as_json(&hit), json!({"type": "hit", "x": 3, "y": 4, "player": 1}));
    assert_eq!(as_json(&miss), json!({"type": "miss", "x": 0, "y": 9, "player": 2}));
}

#[test]
fn test_decode_client_messages() {
    assert_eq!(
        ClientMessage::from_frame(r#"{"type":"start"}"#),
        Ok(ClientMessage::Start)
    );
    assert_eq!(
        ClientMessage::from_frame(r#"{"type":"confirm-ships"}"#),
        Ok(ClientMessage::ConfirmShips)
    );
    assert_eq!(
        ClientMessage::from_frame(r#"{"type":"move","x":3,"y":4}"#),
        Ok(ClientMessage::Move { x: 3, y: 4 })
    );
}

#[test]
fn test_decode_browser_board() {
    let mut rows = vec![vec![0u8; 10]; 10];
    rows[0][0] = 1;
    rows[4][3] = 1;
    rows[9][9] = 2;
    let frame = json!({"type": "setBoard", "board": rows}).to_string();

    let msg = ClientMessage::from_frame(&frame).unwrap();

    let ClientMessage::SetBoard { board } = msg else {
        panic!("expected setBoard");
    };
    assert_eq!(board.cell(0, 0), Ok(Cell::Ship));
    assert_eq!(board.cell(3, 4), Ok(Cell::Ship));
    assert_eq!(board.cell(9, 9), Ok(Cell::Hit));
    assert_eq!(board.ship_cells(), 2);
}

#[test]
fn test_board_encodes_as_nested_arrays() {
    let mut board = Board::new();
    board.set(2, 1, Cell::Ship).unwrap();
    let value = serde_json::to_value(ClientMessage::SetBoard { board }).unwrap();
    assert_eq!(value["type"], "setBoard");
    assert_eq!(value["board"][1][2], 1);
    assert_eq!(value["board"][2][1], 0);
    assert_eq!(value["board"].as_array().unwrap().len(), 10);
}

#[test]
fn test_malformed_frames_rejected() {
    let frames = [
        "not json",
        r#"{"x":1,"y":2}"#,
        r#"{"type":"teleport"}"#,
        r#"{"type":"move","x":-1,"y":2}"#,
        r#"{"type":"move","x":"a","y":2}"#,
        r#"{"type":"setBoard","board":[[0,1]]}"#,
        r#"{"type":"setBoard","board":[]}"#,
    ];
    for frame in frames {
        let result = ClientMessage::from_frame(frame);
        assert!(
            matches!(result, Err(MatchError::Malformed(_))),
            "frame {} decoded to {:?}",
            frame,
            result
        );
    }
}

#[test]
fn test_unknown_cell_state_rejected() {
    let mut rows = vec![vec![0u8; 10]; 10];
    rows[5][5] = 7;
    let frame = json!({"type": "setBoard", "board": rows}).to_string();
    assert!(matches!(
        ClientMessage::from_frame(&frame),
        Err(MatchError::Malformed(_))
    ));
}
