//! Command-line live observer.
//!
//! Connects to a Campus Live server's `/ws` endpoint, folds every frame
//! into an [`ObserverSession`] and prints the view after each one. When the
//! connection ends the final status is printed; there is no reconnect.
//!
//! ```text
//! campus-watch [ws://host:port/ws]
//! ```

mod render;

use campus_live::ObserverSession;
use futures_util::StreamExt;
use std::process::ExitCode;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "ws://127.0.0.1:5000/ws";

fn resolve_url() -> String {
    if let Some(url) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return url;
    }
    match std::env::var("CAMPUS_WATCH_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => DEFAULT_URL.to_string(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let url = resolve_url();
    let mut session = ObserverSession::new();
    println!("{} {}", session.status_label(), url);

    let mut socket = match connect_async(url.as_str()).await {
        Ok((socket, _)) => socket,
        Err(e) => {
            session.on_error(e.to_string());
            eprintln!("[{}] {}", session.status_label(), e);
            return ExitCode::FAILURE;
        }
    };
    session.on_open();
    println!("[{}]", session.status_label());

    loop {
        tokio::select! {
            msg = socket.next() => match msg {
                Some(Ok(Message::Text(text))) => match session.on_text(&text) {
                    Ok(outcome) => {
                        tracing::debug!(?outcome, "frame applied");
                        print!("{}", render::render(&session));
                    }
                    Err(e) => tracing::warn!("skipping frame: {}", e),
                },
                Some(Ok(Message::Close(_))) | None => {
                    session.on_close();
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    session.on_error(e.to_string());
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                if let Err(e) = socket.close(None).await {
                    tracing::debug!("close handshake failed: {}", e);
                }
                session.on_close();
                break;
            }
        }
    }

    println!("[{}]", session.status_label());
    if matches!(
        session.state(),
        campus_live::SessionState::Closed(campus_live::CloseCause::Error(_))
    ) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
