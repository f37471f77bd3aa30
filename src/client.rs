//! The slice of the node RPC API the tracker reads from.

use alloy::{
    eips::BlockNumberOrTag,
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes},
    providers::Provider,
    rpc::types::{Filter, TransactionRequest},
    transports::{RpcError, TransportErrorKind},
};

use crate::eth::{BlockHeader, EventLog};

/// Chain reads required by the tracker.
///
/// Implemented for every alloy [`Provider`]. Implementations are expected to apply their own
/// call timeouts and retries; the tracker never retries.
pub trait ChainClient: Send + Sync {
    /// `eth_getLogs`.
    fn filter_logs(
        &self,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<EventLog>, RpcError<TransportErrorKind>>> + Send;

    /// Header of the latest block, `None` if the node has no head.
    fn latest_header(
        &self,
    ) -> impl Future<Output = Result<Option<BlockHeader>, RpcError<TransportErrorKind>>> + Send;

    /// `eth_call` of `input` against `to` at the latest block.
    fn call_contract(
        &self,
        to: Address,
        input: Bytes,
    ) -> impl Future<Output = Result<Bytes, RpcError<TransportErrorKind>>> + Send;
}

impl<P: Provider> ChainClient for P {
    async fn filter_logs(
        &self,
        filter: &Filter,
    ) -> Result<Vec<EventLog>, RpcError<TransportErrorKind>> {
        debug!("eth_getLogs called");
        let logs = self.get_logs(filter).await?;
        Ok(logs.into_iter().map(EventLog::from).collect())
    }

    async fn latest_header(&self) -> Result<Option<BlockHeader>, RpcError<TransportErrorKind>> {
        debug!("eth_getBlockByNumber called");
        let block = self.get_block_by_number(BlockNumberOrTag::Latest).await?;
        Ok(block.as_ref().map(BlockHeader::from_block::<Ethereum>))
    }

    async fn call_contract(
        &self,
        to: Address,
        input: Bytes,
    ) -> Result<Bytes, RpcError<TransportErrorKind>> {
        debug!(to = %to, "eth_call called");
        let request = TransactionRequest::default().with_to(to).with_input(input);
        self.call(request).await
    }
}
