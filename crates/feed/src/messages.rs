//! Upstream wire messages.
//!
//! The feed speaks JSON text frames. One subscription request names every
//! tracked wallet; each trade message maps onto a [`TradeEvent`] after
//! validation. Unknown fields are tolerated, missing required fields make
//! serde drop the whole message.

use chrono::{DateTime, Utc};
use curvecopy_core::{EventSource, TradeEvent, TradeSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Client -> server subscription. `keys` lists every tracked wallet in a
/// single payload.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest {
    pub method: String,
    pub keys: Vec<String>,
}

impl SubscribeRequest {
    #[must_use]
    pub fn account_trades(wallets: Vec<String>) -> Self {
        Self {
            method: "subscribeAccountTrade".to_string(),
            keys: wallets,
        }
    }
}

/// Raw upstream trade message.
///
/// ```json
/// {
///   "signature": "5j3...",
///   "mint": "8vK...",
///   "traderPublicKey": "FZp...",
///   "txType": "buy",
///   "tokenAmount": 306358.93,
///   "solAmount": 0.099,
///   "newTokenBalance": 306358.93,
///   "bondingCurveKey": "9Xq...",
///   "vTokensInBondingCurve": 1060300193.27,
///   "vSolInBondingCurve": 30.36,
///   "marketCapSol": 28.63,
///   "pool": "pump"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTradeMessage {
    pub signature: String,
    pub mint: String,
    pub trader_public_key: String,
    pub tx_type: String,
    pub token_amount: Decimal,
    pub sol_amount: Decimal,
    pub new_token_balance: Decimal,
    pub bonding_curve_key: String,
    pub v_tokens_in_bonding_curve: Decimal,
    pub v_sol_in_bonding_curve: Decimal,
    pub market_cap_sol: Decimal,
    #[serde(default)]
    pub pool: Option<String>,
}

impl RawTradeMessage {
    /// Validates the message and maps it onto a live-tagged event stamped
    /// with `received_at`. Returns `None` when a required identifier is
    /// empty.
    #[must_use]
    pub fn into_event(self, received_at: DateTime<Utc>) -> Option<TradeEvent> {
        if self.signature.is_empty()
            || self.mint.is_empty()
            || self.trader_public_key.is_empty()
            || self.tx_type.is_empty()
            || self.bonding_curve_key.is_empty()
        {
            return None;
        }

        Some(TradeEvent {
            id: 0,
            signature: self.signature,
            mint: self.mint,
            trader: self.trader_public_key,
            side: TradeSide::from_tx_type(&self.tx_type),
            token_amount: self.token_amount,
            sol_amount: self.sol_amount,
            new_token_balance: self.new_token_balance,
            curve_key: self.bonding_curve_key,
            v_tokens_post: self.v_tokens_in_bonding_curve,
            v_sol_post: self.v_sol_in_bonding_curve,
            market_cap_sol: self.market_cap_sol,
            pool: self.pool,
            received_at,
            ingested_at: None,
            source: EventSource::Live,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sample_json() -> &'static str {
        r#"{
            "signature": "5j3abc",
            "mint": "8vKmint",
            "traderPublicKey": "FZptrader",
            "txType": "BUY",
            "tokenAmount": 306358.93,
            "solAmount": 0.099,
            "newTokenBalance": 306358.93,
            "bondingCurveKey": "9Xqcurve",
            "vTokensInBondingCurve": 1060300193.27,
            "vSolInBondingCurve": 30.36,
            "marketCapSol": 28.63,
            "pool": "pump"
        }"#
    }

    fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn subscription_serializes_method_and_keys() {
        let request =
            SubscribeRequest::account_trades(vec!["w1".to_string(), "w2".to_string()]);
        let json = serde_json::to_string(&request).unwrap();

        assert!(json.contains(r#""method":"subscribeAccountTrade""#));
        assert!(json.contains(r#""keys":["w1","w2"]"#));
    }

    #[test]
    fn valid_message_maps_to_live_event() {
        let raw: RawTradeMessage = serde_json::from_str(sample_json()).unwrap();
        let event = raw.into_event(received_at()).unwrap();

        assert_eq!(event.signature, "5j3abc");
        assert_eq!(event.trader, "FZptrader");
        assert_eq!(event.side, TradeSide::Buy);
        assert_eq!(event.token_amount, dec!(306358.93));
        assert_eq!(event.v_sol_post, dec!(30.36));
        assert_eq!(event.pool.as_deref(), Some("pump"));
        assert_eq!(event.source, EventSource::Live);
        assert_eq!(event.received_at, received_at());
        assert_eq!(event.id, 0);
    }

    #[test]
    fn missing_required_field_fails_decode() {
        let json = r#"{"signature": "abc", "mint": "def"}"#;
        assert!(serde_json::from_str::<RawTradeMessage>(json).is_err());
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let json = sample_json().replacen('{', r#"{"someFutureField": 1,"#, 1);
        let raw: RawTradeMessage = serde_json::from_str(&json).unwrap();
        assert!(raw.into_event(received_at()).is_some());
    }

    #[test]
    fn empty_identifier_fails_validation() {
        let json = sample_json().replace("5j3abc", "");
        let raw: RawTradeMessage = serde_json::from_str(&json).unwrap();
        assert!(raw.into_event(received_at()).is_none());
    }

    #[test]
    fn absent_pool_maps_to_none() {
        let json = sample_json().replace(r#","pool": "pump""#, "");
        let raw: RawTradeMessage = serde_json::from_str(&json).unwrap();
        let event = raw.into_event(received_at()).unwrap();
        assert!(event.pool.is_none());
        assert!(event.is_on_curve());
    }
}
