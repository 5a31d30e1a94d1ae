// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Common types and error definitions for the data availability SDK.

use codec::{Decode, Encode};
use core::{fmt, time::Duration};
use scale_info::TypeInfo;

pub use subxt::utils::H256;

/// Result type for SDK operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Hash of a block on the data availability chain.
pub type BlockHash = H256;

/// SDK error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// JSON-RPC transport or method failure.
	#[error(transparent)]
	Rpc(#[from] subxt::ext::subxt_rpcs::Error),

	/// Failure reported by subxt.
	#[error(transparent)]
	Subxt(#[from] subxt::Error),

	/// SCALE decoding failure.
	#[error(transparent)]
	Codec(#[from] codec::Error),

	/// The node does not know a block with the given number.
	#[error("Block #{0} not found")]
	BlockNotFound(u32),

	/// The node does not know a block with the given hash.
	#[error("Block {0:?} not found")]
	UnknownBlock(BlockHash),

	/// `System.Account` has no entry for the signing account.
	#[error("Account not found on chain: {0}")]
	AccountNotFound(String),

	/// The runtime metadata does not expose the requested call.
	#[error("Call {pallet}.{call} not found in metadata")]
	CallNotFound { pallet: String, call: String },

	/// Extrinsic could not be encoded or signed.
	#[error("Signing failed: {0}")]
	Signing(#[source] Box<dyn std::error::Error + Send + Sync>),

	/// The transaction pool dropped the extrinsic.
	#[error("Transaction dropped from the pool")]
	Dropped,

	/// The extrinsic was declared invalid.
	#[error("Transaction is invalid")]
	Invalid,

	/// Another extrinsic with the same sender and nonce was included.
	#[error("Transaction usurped by another in block {0:?}")]
	Usurped(BlockHash),

	/// The including block was not finalized within the node's window.
	#[error("Finality timeout for block {0:?}")]
	FinalityTimeout(BlockHash),

	/// The status subscription ended before a terminal status arrived.
	#[error("Status subscription closed before inclusion")]
	SubscriptionClosed,

	/// No terminal status arrived within the configured window.
	#[error("Inclusion not observed within {0:?}")]
	InclusionTimeout(Duration),

	/// The extrinsic is missing from the body of the block it was reported in.
	#[error("Extrinsic not found in block {0:?}")]
	ExtrinsicNotInBlock(BlockHash),

	/// Invalid configuration.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

/// Application (channel) identifier carried by the `CheckAppId` extension.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, TypeInfo,
)]
pub struct AppId(pub u32);

impl From<u32> for AppId {
	fn from(id: u32) -> Self {
		Self(id)
	}
}

impl fmt::Display for AppId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Unique location of an included extrinsic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, TypeInfo)]
pub struct ExtrinsicId {
	/// Hash of the block the extrinsic was included in.
	pub block: BlockHash,
	/// Position of the extrinsic inside the block body.
	pub index: u32,
}

impl fmt::Display for ExtrinsicId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?}-{}", self.block, self.index)
	}
}

/// Runtime versions that go into the signed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeVersion {
	pub spec_version: u32,
	pub transaction_version: u32,
}

/// Parameters signed together with a call.
///
/// Always describes an immortal transaction: the era checkpoint is the genesis block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureOptions {
	/// Genesis hash, also used as the era checkpoint block hash.
	pub genesis_hash: BlockHash,
	/// Account nonce read from `System.Account`.
	pub nonce: u64,
	/// Runtime spec version.
	pub spec_version: u32,
	/// Runtime transaction version.
	pub transaction_version: u32,
	/// Tip paid to the block author (always 0).
	pub tip: u128,
	/// Application identifier.
	pub app_id: AppId,
}

impl SignatureOptions {
	/// Block hash the immortal era is anchored to.
	pub fn block_hash(&self) -> BlockHash {
		self.genesis_hash
	}
}

/// Lifecycle notification for a watched extrinsic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
	/// Waiting in the future queue of the pool.
	Future,
	/// Ready to be included.
	Ready,
	/// Gossiped to the listed peers.
	Broadcast(Vec<String>),
	/// Included in the given block.
	InBlock(BlockHash),
	/// The including block was retracted.
	Retracted(BlockHash),
	/// Finality of the including block was not reached in time.
	FinalityTimeout(BlockHash),
	/// Included in the given finalized block.
	Finalized(BlockHash),
	/// Replaced by another extrinsic included in the given block.
	Usurped(BlockHash),
	/// Dropped from the pool.
	Dropped,
	/// Declared invalid.
	Invalid,
}

impl TxStatus {
	/// Whether no further status can follow this one.
	pub fn is_final(&self) -> bool {
		matches!(
			self,
			TxStatus::Finalized(_) |
				TxStatus::Usurped(_) |
				TxStatus::FinalityTimeout(_) |
				TxStatus::Dropped |
				TxStatus::Invalid
		)
	}
}
