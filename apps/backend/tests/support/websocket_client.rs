// WebSocket client utilities for testing

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, COOKIE, SET_COOKIE};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// WebSocket test client
pub struct WebSocketClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Identity from the `Set-Cookie` header of the upgrade response, if any.
    pub issued_id: Option<String>,
}

impl WebSocketClient {
    /// Connect to `/ws`, presenting `player_id` as the identity cookie when given.
    pub async fn connect(
        addr: std::net::SocketAddr,
        player_id: Option<&str>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut request = format!("ws://{addr}/ws").into_client_request()?;
        if let Some(id) = player_id {
            request
                .headers_mut()
                .insert(COOKIE, HeaderValue::from_str(&format!("id={id}"))?);
        }

        let (stream, response) = connect_async(request).await?;
        let issued_id = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .and_then(|pair| pair.trim().strip_prefix("id="))
            .map(str::to_string);

        Ok(Self { stream, issued_id })
    }

    /// Receive the next message with a timeout
    pub async fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<Message>, Box<dyn std::error::Error>> {
        tokio::time::timeout(timeout, self.stream.next())
            .await
            .map_err(|_| "Timeout waiting for message")?
            .transpose()
            .map_err(|e| e.into())
    }

    /// Next text frame parsed as JSON; control frames are skipped. `None`
    /// once the server closes the socket.
    pub async fn recv_json_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<Value>, Box<dyn std::error::Error>> {
        loop {
            match self.recv_timeout(timeout).await? {
                Some(Message::Text(text)) => return Ok(Some(serde_json::from_str(text.as_str())?)),
                Some(Message::Ping(_)) | Some(Message::Pong(_)) | Some(Message::Frame(_)) => continue,
                Some(Message::Binary(_)) => return Err("unexpected binary frame".into()),
                Some(Message::Close(_)) | None => return Ok(None),
            }
        }
    }

    /// True if the server closes the socket within `timeout`.
    pub async fn closed_within(&mut self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match tokio::time::timeout(remaining, self.stream.next()).await {
                Err(_) => return false,
                Ok(None) | Ok(Some(Err(_))) | Ok(Some(Ok(Message::Close(_)))) => return true,
                Ok(Some(Ok(_))) => continue,
            }
        }
    }

    pub async fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.close(None).await?;
        Ok(())
    }

    pub async fn send_text(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }
}
