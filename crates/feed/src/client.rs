//! WebSocket feed client.
//!
//! Owns the upstream connection and the signature dedup ring. `receive`
//! yields at most one event per call; messages that decode badly, fail
//! validation, or repeat a recent signature are consumed silently. Transport
//! failures and close frames surface as errors so the ingest driver knows to
//! reopen the connection.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use curvecopy_core::{TradeEvent, WebSocketConfig};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::dedup::SignatureRing;
use crate::messages::{RawTradeMessage, SubscribeRequest};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct FeedClient {
    url: String,
    stream: Option<WsStream>,
    dedup: SignatureRing,
}

impl FeedClient {
    #[must_use]
    pub fn new(config: &WebSocketConfig) -> Self {
        Self {
            url: config.url.clone(),
            stream: None,
            dedup: SignatureRing::new(config.dedup_buffer_size),
        }
    }

    /// Opens the connection and subscribes to every tracked wallet in a
    /// single payload.
    ///
    /// # Errors
    /// Returns an error if the connection or the subscribe send fails.
    pub async fn connect_and_subscribe(&mut self, tracked_wallets: &[String]) -> Result<()> {
        let (ws_stream, _) = connect_async(&self.url)
            .await
            .context("failed to connect to feed")?;
        self.stream = Some(ws_stream);

        let request = SubscribeRequest::account_trades(tracked_wallets.to_vec());
        let payload =
            serde_json::to_string(&request).context("failed to serialize subscription")?;
        if let Some(stream) = self.stream.as_mut() {
            stream
                .send(Message::Text(payload))
                .await
                .context("failed to send subscription")?;
        }

        tracing::info!(
            url = %self.url,
            wallets = tracked_wallets.len(),
            "subscribed to account trades"
        );
        Ok(())
    }

    /// Reads one upstream message.
    ///
    /// `Ok(Some(event))` is a fresh, valid trade stamped with `received_at`.
    /// `Ok(None)` means the message was consumed without producing an event
    /// (decode failure, missing identifiers, duplicate signature, control
    /// frames).
    ///
    /// # Errors
    /// Returns an error on transport failure, a close frame, or a stream
    /// that ended; the caller must reconnect before calling again.
    pub async fn receive(&mut self) -> Result<Option<TradeEvent>> {
        let Some(stream) = self.stream.as_mut() else {
            bail!("feed is not connected");
        };

        match stream.next().await {
            Some(Ok(Message::Text(text))) => Ok(self.handle_text(&text)),
            Some(Ok(Message::Close(frame))) => {
                self.stream = None;
                bail!("feed closed the connection: {frame:?}");
            }
            Some(Ok(_)) => Ok(None), // ping/pong/binary
            Some(Err(e)) => {
                self.stream = None;
                Err(e).context("feed transport error")
            }
            None => {
                self.stream = None;
                bail!("feed stream ended");
            }
        }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn handle_text(&mut self, text: &str) -> Option<TradeEvent> {
        let raw: RawTradeMessage = match serde_json::from_str(text) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(error = %e, "dropping undecodable feed message");
                return None;
            }
        };

        let Some(event) = raw.into_event(Utc::now()) else {
            tracing::debug!("dropping feed message with empty identifiers");
            return None;
        };

        if !self.dedup.insert(&event.signature) {
            tracing::debug!(signature = %event.signature, "duplicate signature suppressed");
            return None;
        }

        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FeedClient {
        FeedClient::new(&WebSocketConfig::default())
    }

    fn trade_json(signature: &str) -> String {
        format!(
            r#"{{
                "signature": "{signature}",
                "mint": "mint-a",
                "traderPublicKey": "trader-1",
                "txType": "buy",
                "tokenAmount": 1000,
                "solAmount": 0.1,
                "newTokenBalance": 1000,
                "bondingCurveKey": "curve-1",
                "vTokensInBondingCurve": 1000000000,
                "vSolInBondingCurve": 30,
                "marketCapSol": 60
            }}"#
        )
    }

    #[test]
    fn fresh_message_produces_an_event() {
        let mut c = client();
        let event = c.handle_text(&trade_json("sig-1")).unwrap();
        assert_eq!(event.signature, "sig-1");
        assert_eq!(event.trader, "trader-1");
    }

    #[test]
    fn repeated_signature_is_suppressed() {
        let mut c = client();
        assert!(c.handle_text(&trade_json("sig-1")).is_some());
        assert!(c.handle_text(&trade_json("sig-1")).is_none());
        assert!(c.handle_text(&trade_json("sig-2")).is_some());
    }

    #[test]
    fn undecodable_text_is_dropped() {
        let mut c = client();
        assert!(c.handle_text("not json at all").is_none());
        assert!(c.handle_text(r#"{"signature": "only"}"#).is_none());
    }

    #[test]
    fn empty_identifier_is_dropped_without_poisoning_dedup() {
        let mut c = client();
        assert!(c.handle_text(&trade_json("")).is_none());
        // A later message with a real signature still passes.
        assert!(c.handle_text(&trade_json("sig-1")).is_some());
    }

    #[tokio::test]
    async fn receive_before_connect_is_an_error() {
        let mut c = client();
        assert!(c.receive().await.is_err());
        assert!(!c.is_connected());
    }
}
