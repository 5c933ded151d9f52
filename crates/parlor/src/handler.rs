//! Per-connection handler: the hub each player's WebSocket runs through.
//!
//! One Tokio task per socket, processing frames strictly in arrival
//! order. The connection starts unauthenticated; a successful
//! `authRequest` admits it to its session's room, and `changeName` /
//! `removalRequest` are only honored after that — an unauthenticated
//! sender is silently ignored, since it has no legitimate channel to
//! answer on.
//!
//! The socket's write half lives in its own task fed by the room channel,
//! so room broadcasts, direct replies, and the kick-then-close sequence
//! all flow through one ordered stream.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use parlor_protocol::{ClientEvent, ConnectionId, ServerEvent, SessionCode};
use parlor_room::{MemberSender, RoomOutbound};
use parlor_session::SessionError;
use tokio::sync::mpsc;

use crate::error::present;
use crate::server::AppState;
use crate::EnvMode;

/// Counter for allocating connection ids.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Where this connection is in its lifecycle. Closed is implicit: the
/// task returning.
enum Phase {
    Unauthenticated,
    Authenticated { code: SessionCode, name: String },
}

/// `GET /socket` — upgrade and hand the socket to its own task.
pub(crate) async fn socket_endpoint(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let conn = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
    tracing::debug!(%conn, "connection opened");

    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<RoomOutbound>();

    // Writer task: owns the sink. Ends on a Close signal, a send failure,
    // or when every sender (room membership + this handler) is gone.
    let writer = tokio::spawn(async move {
        while let Some(outbound) = out_rx.recv().await {
            match outbound {
                RoomOutbound::Event(event) => {
                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                RoomOutbound::Close => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    let mut phase = Phase::Unauthenticated;

    while let Some(frame) = stream.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(%conn, error = %err, "socket error");
                break;
            }
        };
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Ping/pong are answered by the transport; binary is not part
            // of this protocol.
            _ => continue,
        };

        let event: ClientEvent = match serde_json::from_str(&text) {
            Ok(event) => event,
            Err(err) => {
                tracing::debug!(%conn, error = %err, "undecodable frame");
                continue;
            }
        };

        dispatch(&state, conn, &mut phase, &out_tx, event).await;
    }

    if let Phase::Authenticated { code, .. } = phase {
        state.rooms.lock().await.leave(code, conn);
    }
    // Drop our sender so the writer drains and exits once the room has
    // let go of its clone too.
    drop(out_tx);
    let _ = writer.await;
    tracing::debug!(%conn, "connection closed");
}

async fn dispatch(
    state: &AppState,
    conn: ConnectionId,
    phase: &mut Phase,
    out_tx: &MemberSender,
    event: ClientEvent,
) {
    match event {
        ClientEvent::AuthRequest {
            game_code,
            name,
            key,
        } => {
            if matches!(phase, Phase::Authenticated { .. }) {
                tracing::debug!(%conn, "authRequest on authenticated connection ignored");
                return;
            }
            match state.auth.authenticate(conn, game_code, &name, &key).await {
                Ok(success) => {
                    state
                        .rooms
                        .lock()
                        .await
                        .join(success.code, conn, out_tx.clone());
                    *phase = Phase::Authenticated {
                        code: success.code,
                        name: success.name,
                    };
                    state.publisher.broadcast_status(game_code).await;
                }
                Err(err) => send_error(out_tx, &err, state.env),
            }
        }

        ClientEvent::ChangeName { new_name } => {
            let Phase::Authenticated { code, name } = phase else {
                tracing::debug!(%conn, "changeName before auth ignored");
                return;
            };
            let code = *code;
            match state.join.rename(code, name, &new_name).await {
                Ok(()) => {
                    *name = new_name.clone();
                    // Confirmation goes to the requester only; the roster
                    // change reaches everyone through the status push.
                    state.rooms.lock().await.send_to(
                        code,
                        conn,
                        ServerEvent::NameChanged { new_name },
                    );
                    state.publisher.broadcast_status(code).await;
                }
                Err(err) => send_error(out_tx, &err, state.env),
            }
        }

        ClientEvent::RemovalRequest { name: target } => {
            let Phase::Authenticated { code, .. } = phase else {
                tracing::debug!(%conn, "removalRequest before auth ignored");
                return;
            };
            let code = *code;
            match state.join.remove(code, &target).await {
                Ok(outcome) => {
                    {
                        let mut rooms = state.rooms.lock().await;
                        // Kick before broadcasting so nothing stale
                        // reaches the removed player's connection.
                        if let Some(victim) = outcome.connection {
                            rooms.kick(code, victim);
                        }
                        if outcome.session_destroyed {
                            rooms.close(code);
                        } else {
                            rooms.broadcast(
                                code,
                                ServerEvent::RemovedPlayer {
                                    name: target.clone(),
                                },
                            );
                        }
                    }
                    if !outcome.session_destroyed {
                        state.publisher.broadcast_status(code).await;
                    }
                }
                Err(err) => send_error(out_tx, &err, state.env),
            }
        }
    }
}

fn send_error(out_tx: &MemberSender, err: &SessionError, env: EnvMode) {
    let _ = out_tx.send(RoomOutbound::Event(ServerEvent::MyError(present(
        err, env,
    ))));
}
