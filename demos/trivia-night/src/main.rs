//! Trivia night: runs a Quizhall server on a single port.
//!
//! Point any WebSocket client at it, send
//! `{"type":"createRoom","moderatorNickname":"quinn"}` and share the
//! room code.

use quizhall::QuizServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    quizhall::init_tracing("info");

    let addr = std::env::var("QUIZHALL_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    tracing::info!(%addr, "starting trivia night server");

    let server = QuizServer::builder().bind(&addr).build().await?;
    server.run().await?;
    Ok(())
}
