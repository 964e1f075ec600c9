use crate::error::ExplorerError;
use crate::models::RawTransfer;
use async_trait::async_trait;

/// Which side of a timestamp to snap to when resolving a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closest {
    Before,
    After,
}

impl Closest {
    pub fn as_str(&self) -> &'static str {
        match self {
            Closest::Before => "before",
            Closest::After => "after",
        }
    }
}

/// Ledger data the analysis pipeline needs. Implemented over the block
/// explorer API in production and by in-memory fakes in tests.
#[async_trait]
pub trait TransferSource: Send + Sync {
    async fn resolve_block_at_time(&self, timestamp: i64, closest: Closest) -> Result<u64, ExplorerError>;

    /// Token transfers touching `address` within `[start_block, end_block]`,
    /// ascending by time.
    async fn list_token_transfers(
        &self,
        address: &str,
        start_block: u64,
        end_block: u64,
    ) -> Result<Vec<RawTransfer>, ExplorerError>;
}
