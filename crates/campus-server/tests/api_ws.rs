use campus_auth::{register_club, TokenService};
use campus_live::{LiveService, ObserverSession};
use campus_server::{app, AppState};
use campus_types::{ActorIdentity, AnnouncementRecord};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

struct Server {
    addr: SocketAddr,
    live: Arc<LiveService>,
    token: String,
    _dir: tempfile::TempDir,
}

async fn start_server() -> Server {
    start_server_with_capacity(campus_live::DEFAULT_QUEUE_CAPACITY).await
}

async fn start_server_with_capacity(queue_capacity: usize) -> Server {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ws.db");
    let pool =
        campus_db::open_database(db_path.to_str().unwrap(), campus_db::DbRuntimeSettings::default())
            .unwrap();
    let tokens = TokenService::new("ws-test-secret", 24);
    let token = {
        let conn = pool.get().unwrap();
        let club = register_club(&conn, "Drama Club", "drama@univ.com", "stage").unwrap();
        tokens.issue(&club).unwrap()
    };

    let live = Arc::new(LiveService::new(queue_capacity));
    let state = AppState {
        pool,
        live: live.clone(),
        tokens: Arc::new(tokens),
    };

    let app = app(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    Server {
        addr,
        live,
        token,
        _dir: dir,
    }
}

/// Connects an observer and folds its first frame (the snapshot).
async fn connect(addr: SocketAddr, path: &str) -> (Socket, ObserverSession) {
    let (mut socket, _) = connect_async(format!("ws://{addr}{path}"))
        .await
        .expect("failed to connect");
    let mut session = ObserverSession::new();
    session.on_open();
    next_frame(&mut socket, &mut session).await;
    (socket, session)
}

/// Reads one text frame and folds it into `session`.
async fn next_frame(socket: &mut Socket, session: &mut ObserverSession) {
    let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("timed out waiting for a live frame")
        .expect("socket ended")
        .expect("socket error");
    match msg {
        Message::Text(text) => {
            session.on_text(&text).expect("undecodable frame");
        }
        other => panic!("unexpected message {other:?}"),
    }
}

async fn post_update(addr: SocketAddr, token: &str, event: &str, update: &str) {
    // Plain HTTP/1.1 over a raw socket keeps the test free of an HTTP client.
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let body = serde_json::json!({"event": event, "update": update}).to_string();
    let request = format!(
        "POST /api/add-update HTTP/1.1\r\nHost: {addr}\r\nAuthorization: Bearer {token}\r\n\
         Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
}

fn records(session: &ObserverSession) -> Vec<AnnouncementRecord> {
    session.view().iter().cloned().collect()
}

#[tokio::test]
async fn two_observers_see_the_same_announcements() {
    let server = start_server().await;

    let (mut socket_a, mut a) = connect(server.addr, "/ws").await;
    assert!(a.view().is_empty());

    post_update(server.addr, &server.token, "Seminar", "Starts at 5 PM").await;
    next_frame(&mut socket_a, &mut a).await;
    assert_eq!(
        records(&a),
        vec![AnnouncementRecord::new(1, "Seminar", "Starts at 5 PM")]
    );

    let (mut socket_b, mut b) = connect(server.addr, "/ws/updates").await;
    assert_eq!(records(&b), records(&a));

    post_update(server.addr, &server.token, "Workshop", "Room 204").await;
    next_frame(&mut socket_a, &mut a).await;
    next_frame(&mut socket_b, &mut b).await;

    let expected = vec![
        AnnouncementRecord::new(2, "Workshop", "Room 204"),
        AnnouncementRecord::new(1, "Seminar", "Starts at 5 PM"),
    ];
    assert_eq!(records(&a), expected);
    assert_eq!(records(&b), expected);

    socket_a.close(None).await.unwrap();
    socket_b.close(None).await.unwrap();
}

#[tokio::test]
async fn closed_observer_is_dropped_and_others_keep_receiving() {
    let server = start_server().await;
    let actor = ActorIdentity {
        club_id: 1,
        name: "Drama Club".to_string(),
        email: "drama@univ.com".to_string(),
    };

    let (mut gone, _) = connect(server.addr, "/ws").await;
    let (mut kept, mut session) = connect(server.addr, "/ws").await;
    assert_eq!(server.live.observer_count().await, 2);

    gone.close(None).await.unwrap();
    // Let the server observe the close frame.
    let mut waited = 0;
    while server.live.observer_count().await > 1 && waited < 50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += 1;
    }
    assert_eq!(server.live.observer_count().await, 1);

    server
        .live
        .publish(&actor, "Auditions", "Friday 4 PM")
        .await
        .unwrap();
    next_frame(&mut kept, &mut session).await;
    assert_eq!(session.view()[0].event, "Auditions");
}

#[tokio::test]
async fn inbound_chatter_is_ignored() {
    let server = start_server().await;
    let (mut socket, mut session) = connect(server.addr, "/ws").await;

    socket
        .send(Message::Text("hello?".to_string().into()))
        .await
        .unwrap();
    post_update(server.addr, &server.token, "Quiz", "Round 2").await;
    next_frame(&mut socket, &mut session).await;

    assert_eq!(records(&session), vec![AnnouncementRecord::new(1, "Quiz", "Round 2")]);
}

#[tokio::test]
async fn overflowing_observer_is_closed_and_can_resubscribe() {
    let server = start_server_with_capacity(1).await;
    let actor = ActorIdentity {
        club_id: 1,
        name: "Drama Club".to_string(),
        email: "drama@univ.com".to_string(),
    };

    let (mut socket, mut session) = connect(server.addr, "/ws").await;

    // No await point yields between the two publishes, so the writer task
    // cannot drain the single-slot queue in between.
    server.live.publish(&actor, "Seminar", "Starts at 5 PM").await.unwrap();
    server.live.publish(&actor, "Workshop", "Room 204").await.unwrap();
    assert_eq!(server.live.observer_count().await, 0);

    next_frame(&mut socket, &mut session).await;
    let closing = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("timed out waiting for close");
    match closing {
        Some(Ok(Message::Close(_))) | None => session.on_close(),
        other => panic!("expected the socket to close, got {other:?}"),
    }
    assert_eq!(session.status_label(), "Disconnected");
    assert_eq!(
        records(&session),
        vec![AnnouncementRecord::new(1, "Seminar", "Starts at 5 PM")]
    );

    let (_socket, fresh) = connect(server.addr, "/ws").await;
    assert_eq!(
        records(&fresh),
        vec![
            AnnouncementRecord::new(2, "Workshop", "Room 204"),
            AnnouncementRecord::new(1, "Seminar", "Starts at 5 PM"),
        ]
    );
}
