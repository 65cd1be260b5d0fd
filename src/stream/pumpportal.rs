//! PumpPortal WebSocket transport for token creation events
//!
//! PumpPortal provides a free WebSocket API for real-time pump.fun data.
//!
//! WebSocket endpoint: wss://pumpportal.fun/api/data
//! Documentation: https://pumpportal.fun/data-api/real-time

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::{Connection, CreationEvent, KeepAlive, Transport};
use crate::error::{Error, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Pump.fun tokens launch with a fixed supply of one billion
const PUMP_TOTAL_SUPPLY: f64 = 1_000_000_000.0;

/// Subscription message
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionMessage {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
}

impl SubscriptionMessage {
    /// Subscribe to new token creation events
    pub fn subscribe_new_tokens() -> Self {
        Self {
            method: "subscribeNewToken".to_string(),
            keys: None,
        }
    }
}

/// New token message from PumpPortal
///
/// PumpPortal does not report freeze authority, LP state or socials; those
/// keys are accepted when an enriching relay adds them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTokenMessage {
    pub mint: String,
    #[serde(default)]
    pub trader_public_key: String,
    pub tx_type: String,
    /// Tokens bought by the creator in the launch transaction
    #[serde(default)]
    pub initial_buy: Option<f64>,
    /// SOL in the bonding curve
    #[serde(default)]
    pub v_sol_in_bonding_curve: Option<f64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub is_freezable: Option<bool>,
    #[serde(default)]
    pub lp_burned: Option<bool>,
    #[serde(default)]
    pub is_lp_bundle: Option<bool>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl From<NewTokenMessage> for CreationEvent {
    fn from(msg: NewTokenMessage) -> Self {
        let socials = [&msg.twitter, &msg.telegram, &msg.website];
        let has_socials = if socials.iter().all(|s| s.is_none()) {
            None
        } else {
            Some(
                socials
                    .iter()
                    .any(|s| s.as_deref().is_some_and(|v| !v.trim().is_empty())),
            )
        };

        let mut event = CreationEvent::new(msg.mint, msg.name, msg.symbol, msg.trader_public_key);
        event.pool_size = msg.v_sol_in_bonding_curve;
        event.dev_hold = msg.initial_buy.map(|tokens| tokens / PUMP_TOTAL_SUPPLY);
        event.is_freezable = msg.is_freezable;
        event.lp_burned = msg.lp_burned;
        event.is_lp_bundle = msg.is_lp_bundle;
        event.has_socials = has_socials;
        event
    }
}

/// Decode one text frame.
///
/// Returns `Ok(None)` for anything that is not a token creation (subscription
/// acks, trades, non-JSON payloads). A frame that claims to be a creation but
/// does not decode is an error.
pub fn decode_message(text: &str) -> Result<Option<CreationEvent>> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            let preview: String = text.chars().take(100).collect();
            debug!("Unknown message: {}", preview);
            return Ok(None);
        }
    };

    match value.get("txType").and_then(|t| t.as_str()) {
        Some("create") => {
            let msg: NewTokenMessage = serde_json::from_value(value)
                .map_err(|e| Error::StreamDecode(format!("Malformed create event: {}", e)))?;
            Ok(Some(msg.into()))
        }
        Some(other) => {
            debug!("Ignoring {} message", other);
            Ok(None)
        }
        None => {
            debug!("Ignoring message without txType");
            Ok(None)
        }
    }
}

/// Connects to PumpPortal and subscribes to new tokens
#[derive(Debug, Clone)]
pub struct PumpPortalTransport {
    ws_url: String,
}

impl PumpPortalTransport {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
        }
    }
}

#[async_trait]
impl Transport for PumpPortalTransport {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        info!("Connecting to PumpPortal WebSocket...");

        let url = url::Url::parse(&self.ws_url)
            .map_err(|e| Error::Config(format!("Invalid WebSocket URL: {}", e)))?;

        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| Error::StreamConnection(format!("WebSocket connect failed: {}", e)))?;

        let (mut write, read) = ws_stream.split();

        let json = serde_json::to_string(&SubscriptionMessage::subscribe_new_tokens())?;
        write
            .send(Message::Text(json))
            .await
            .map_err(|e| Error::StreamConnection(format!("Failed to subscribe: {}", e)))?;

        info!("Connected to PumpPortal, subscribed to new token events");

        Ok(Box::new(PumpPortalConnection {
            read,
            write: Arc::new(Mutex::new(write)),
        }))
    }
}

/// Live PumpPortal connection
pub struct PumpPortalConnection {
    read: SplitStream<WsStream>,
    write: Arc<Mutex<WsSink>>,
}

#[async_trait]
impl Connection for PumpPortalConnection {
    async fn next_event(&mut self) -> Result<Option<CreationEvent>> {
        loop {
            match self.read.next().await {
                Some(Ok(Message::Text(text))) => {
                    if let Some(event) = decode_message(&text)? {
                        return Ok(Some(event));
                    }
                }
                Some(Ok(Message::Pong(_))) => {
                    debug!("Received pong");
                }
                Some(Ok(Message::Close(frame))) => {
                    info!("WebSocket closed by server: {:?}", frame);
                    return Ok(None);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    return Err(Error::StreamClosed(format!("WebSocket error: {}", e)));
                }
                None => {
                    info!("WebSocket stream ended");
                    return Ok(None);
                }
            }
        }
    }

    fn keepalive(&self) -> Arc<dyn KeepAlive> {
        Arc::new(WsPinger {
            write: self.write.clone(),
        })
    }

    async fn close(&mut self) -> Result<()> {
        let mut write = self.write.lock().await;
        if let Err(e) = write.close().await {
            warn!("Error closing WebSocket: {}", e);
        }
        Ok(())
    }
}

/// Ping-only handle onto the write half
struct WsPinger {
    write: Arc<Mutex<WsSink>>,
}

#[async_trait]
impl KeepAlive for WsPinger {
    async fn ping(&self) -> Result<()> {
        self.write
            .lock()
            .await
            .send(Message::Ping(vec![]))
            .await
            .map_err(|e| Error::StreamClosed(format!("Failed to send ping: {}", e)))?;
        debug!("Sent ping");
        Ok(())
    }
}
