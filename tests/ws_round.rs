//! End-to-end match over real WebSocket connections.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use rps_rs::AppState;

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> String {
    let state = Arc::new(AppState::new());
    let app = rps_rs::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("ws://{}/ws/rps", addr)
}

async fn send_json(ws: &mut Ws, value: Value) {
    ws.send(Message::Text(value.to_string())).await.unwrap();
}

async fn next_json(ws: &mut Ws) -> Value {
    loop {
        match ws.next().await.expect("stream ended").expect("ws error") {
            Message::Text(text) => return serde_json::from_str(&text).unwrap(),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn test_two_clients_play_a_full_match() {
    let url = spawn_server().await;

    let (mut alice, _) = connect_async(format!("{}?player=alice", url)).await.unwrap();
    let (mut bob, _) = connect_async(format!("{}?player=bob", url)).await.unwrap();

    // Alice creates a room
    send_json(&mut alice, json!({"type": "createGame"})).await;
    let new_game = next_json(&mut alice).await;
    assert_eq!(new_game["type"], "newGame");
    let code = new_game["roomCode"].as_str().unwrap().to_string();

    // Bob joins it; both hear about it, Alice gets the first-choice hint
    send_json(&mut bob, json!({"type": "joinGame", "roomCode": code})).await;
    assert_eq!(next_json(&mut alice).await["type"], "playersConnected");
    assert_eq!(next_json(&mut alice).await["type"], "enableChoice");
    assert_eq!(next_json(&mut bob).await["type"], "playersConnected");

    // A third client cannot take a seat
    let (mut carol, _) = connect_async(url.as_str()).await.unwrap();
    send_json(&mut carol, json!({"type": "joinGame", "roomCode": code})).await;
    let rejection = next_json(&mut carol).await;
    assert_eq!(rejection["type"], "error");
    assert_eq!(rejection["message"], "Room is full");

    // Round one: Rock vs Scissors
    send_json(
        &mut alice,
        json!({"type": "playerChoice", "roomCode": code, "move": "Rock"}),
    )
    .await;
    assert_eq!(next_json(&mut bob).await["type"], "enableChoice");
    send_json(
        &mut bob,
        json!({"type": "playerChoice", "roomCode": code, "move": "Scissors"}),
    )
    .await;

    let reveal_alice = next_json(&mut alice).await;
    let reveal_bob = next_json(&mut bob).await;
    assert_eq!(reveal_alice["type"], "revealChoices");
    assert_eq!(reveal_alice, reveal_bob);
    assert_eq!(reveal_alice["player1Choice"], "Rock");
    assert_eq!(reveal_alice["player2Choice"], "Scissors");

    let result_alice = next_json(&mut alice).await;
    assert_eq!(result_alice["type"], "gameResult");
    assert_eq!(result_alice["winner"], "p1");
    assert_eq!(next_json(&mut bob).await, result_alice);

    // Round two after playAgain: Paper vs Paper draws
    send_json(&mut alice, json!({"type": "playAgain", "roomCode": code})).await;
    assert_eq!(next_json(&mut alice).await["type"], "resetForNewRound");
    assert_eq!(next_json(&mut bob).await["type"], "resetForNewRound");
    assert_eq!(next_json(&mut alice).await["type"], "enableChoice");

    send_json(
        &mut alice,
        json!({"type": "playerChoice", "roomCode": code, "move": "Paper"}),
    )
    .await;
    assert_eq!(next_json(&mut bob).await["type"], "enableChoice");
    send_json(
        &mut bob,
        json!({"type": "playerChoice", "roomCode": code, "move": "Paper"}),
    )
    .await;

    assert_eq!(next_json(&mut alice).await["type"], "revealChoices");
    assert_eq!(next_json(&mut bob).await["type"], "revealChoices");
    assert_eq!(next_json(&mut alice).await["winner"], "draw");
    assert_eq!(next_json(&mut bob).await["winner"], "draw");

    // Bob drops the connection; Alice is told
    bob.close(None).await.unwrap();
    assert_eq!(next_json(&mut alice).await["type"], "opponentDisconnected");
}

#[tokio::test]
async fn test_join_unknown_room_over_the_wire() {
    let url = spawn_server().await;
    let (mut client, _) = connect_async(url.as_str()).await.unwrap();

    send_json(&mut client, json!({"type": "joinGame", "roomCode": "NOSUCH"})).await;
    let msg = next_json(&mut client).await;
    assert_eq!(msg["type"], "error");
    assert_eq!(msg["message"], "Room not found");
}
