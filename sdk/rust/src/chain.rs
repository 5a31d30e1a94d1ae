// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Chain access traits.
//!
//! [`ChainClient`] is everything the submission flow needs from a node: a handful of
//! reads, extrinsic construction and signing, and one watched submission. Implement it
//! to plug in a different transport; [`crate::RpcChainClient`] talks to a node over
//! JSON-RPC and [`crate::MockChainClient`] answers from memory.

use crate::types::{BlockHash, Result, RuntimeVersion, SignatureOptions, TxStatus};
use subxt_signer::sr25519::Keypair;

/// Read and submit access to a data availability node.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
	/// Decoded runtime metadata.
	type Metadata: Send + Sync;
	/// A call ready to be signed.
	type Call: Send + Sync;
	/// Status stream of a watched extrinsic.
	type Subscription: StatusSubscription;

	/// Hash of the block with the given number.
	async fn block_hash(&self, number: u32) -> Result<BlockHash>;

	/// Runtime version at the latest block.
	async fn runtime_version(&self) -> Result<RuntimeVersion>;

	/// Runtime metadata at the latest block.
	async fn metadata(&self) -> Result<Self::Metadata>;

	/// Build the storage key of a map entry.
	fn storage_key(
		&self,
		metadata: &Self::Metadata,
		pallet: &str,
		entry: &str,
		key: &[u8],
	) -> Result<Vec<u8>>;

	/// Raw storage value at the latest block, `None` if absent.
	async fn storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

	/// Build a call taking a single byte-vector argument.
	///
	/// Fails with [`crate::Error::CallNotFound`] when the metadata lacks the call.
	fn new_call(
		&self,
		metadata: &Self::Metadata,
		pallet: &str,
		call: &str,
		payload: Vec<u8>,
	) -> Result<Self::Call>;

	/// Sign a call and return the encoded extrinsic.
	fn sign(
		&self,
		metadata: &Self::Metadata,
		call: &Self::Call,
		signer: &Keypair,
		options: &SignatureOptions,
	) -> Result<Vec<u8>>;

	/// Submit an encoded extrinsic and subscribe to its status.
	async fn submit_and_watch(&self, extrinsic: Vec<u8>) -> Result<Self::Subscription>;

	/// Encoded extrinsics of a block body, in order.
	async fn block_extrinsics(&self, block: BlockHash) -> Result<Vec<Vec<u8>>>;
}

/// Status updates for a single submitted extrinsic.
#[async_trait::async_trait]
pub trait StatusSubscription: Send {
	/// Next status, `None` once the stream is closed.
	async fn next_status(&mut self) -> Option<Result<TxStatus>>;

	/// Stop receiving updates and release the subscription.
	fn unsubscribe(&mut self);
}
