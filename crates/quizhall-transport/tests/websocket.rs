//! Integration tests for the WebSocket transport: a real server and
//! client exchanging text frames over a loopback socket.

#[cfg(feature = "websocket")]
mod websocket {
    use quizhall_transport::{Connection, Transport, WebSocketTransport};

    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on an OS-assigned port and connects one client to it.
    async fn server_and_client() -> (quizhall_transport::WebSocketConnection, ClientWs)
    {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("should have local addr");

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let url = format!("ws://{addr}");
        let (client_ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");
        let server_conn = server_handle.await.expect("task should complete");

        (server_conn, client_ws)
    }

    #[tokio::test]
    async fn test_websocket_send_and_receive_text_frames() {
        let (server_conn, mut client_ws) = server_and_client().await;
        assert!(server_conn.id().into_inner() > 0);

        // Server sends, client receives.
        server_conn
            .send(r#"{"type":"roomCreated"}"#)
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_text().unwrap(), r#"{"type":"roomCreated"}"#);

        // Client sends, server receives.
        client_ws
            .send(Message::Text(r#"{"type":"createRoom"}"#.into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, r#"{"type":"createRoom"}"#);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_accepts_binary_json() {
        let (server_conn, mut client_ws) = server_and_client().await;

        client_ws
            .send(Message::Binary(br#"{"type":"leaveRoom"}"#.to_vec().into()))
            .await
            .unwrap();
        let received = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(received, r#"{"type":"leaveRoom"}"#);
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (server_conn, mut client_ws) = server_and_client().await;

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }
}
