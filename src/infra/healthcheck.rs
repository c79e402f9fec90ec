// Liveness probe for the hosting platform. Any request on any path gets the
// same 200 text/plain answer; there is no routing and no body parsing.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const HEALTH_BODY: &str = "Bot is running\n";

/// Bind `0.0.0.0:port` and answer every connection until the process exits.
pub async fn serve(port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("🌐 Healthcheck server listening on port {}", port);
    run(listener).await
}

/// Accept loop over an already-bound listener.
pub async fn run(listener: TcpListener) -> std::io::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        tokio::spawn(async move {
            if let Err(e) = respond(socket).await {
                tracing::debug!(%peer, "Healthcheck connection failed: {}", e);
            }
        });
    }
}

async fn respond(mut socket: TcpStream) -> std::io::Result<()> {
    // Drain what the client sent so it doesn't see a reset; content is ignored.
    let mut buf = [0u8; 1024];
    let _ = socket.read(&mut buf).await?;

    socket.write_all(response().as_bytes()).await?;
    socket.shutdown().await
}

fn response() -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        HEALTH_BODY.len(),
        HEALTH_BODY
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answers_with_fixed_200() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(run(listener));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /anything HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        let mut reply = String::new();
        stream.read_to_string(&mut reply).await.unwrap();

        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(reply.contains("Content-Type: text/plain\r\n"));
        assert!(reply.ends_with("\r\n\r\nBot is running\n"));
    }
}
