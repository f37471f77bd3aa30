use alloy::{
    consensus::BlockHeader as _,
    network::{BlockResponse, Network, primitives::HeaderResponse},
    primitives::{B256, BlockNumber},
};

/// The parts of a block header this crate reads.
///
/// Nodes differ in which header fields they return, so only fields every node provides are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockHeader {
    pub number: BlockNumber,
    pub hash: B256,
    pub parent_hash: B256,
    pub timestamp: u64,
}

impl BlockHeader {
    pub(crate) fn from_block<N: Network>(block: &N::BlockResponse) -> Self {
        let header = block.header();
        Self {
            number: header.number(),
            hash: header.hash(),
            parent_hash: header.parent_hash(),
            timestamp: header.timestamp(),
        }
    }
}
