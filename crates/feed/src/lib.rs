pub mod backoff;
pub mod client;
pub mod dedup;
pub mod messages;

pub use backoff::{backoff_delay, ReconnectBackoff};
pub use client::FeedClient;
pub use dedup::SignatureRing;
pub use messages::{RawTradeMessage, SubscribeRequest};
