use crate::events::{TradeExecutionResult, TradeIntent};
use anyhow::Result;
use async_trait::async_trait;

/// The single seam between the pipeline and an execution venue.
///
/// The simulation variant is the default; a live variant can replace it at
/// process start without any downstream component knowing which is active.
/// Rejections are expressed as `success = false` results, never as errors.
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    async fn execute(&self, intent: &TradeIntent) -> Result<TradeExecutionResult>;
}
