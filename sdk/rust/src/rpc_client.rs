// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! [`ChainClient`] over a node's JSON-RPC interface.
//!
//! Uses subxt's legacy RPC methods so every read is a single request against the
//! latest block, and builds and signs extrinsics offline with `subxt-core` from the
//! metadata and parameters the submission flow hands in.

use crate::{
	chain::{ChainClient, StatusSubscription},
	config::ClientConfig,
	subxt_config::{AvailConfig, AvailExtrinsicParamsBuilder},
	types::{BlockHash, Error, Result, RuntimeVersion, SignatureOptions, TxStatus},
};
use codec::{Decode, Encode};
use subxt::{
	backend::{
		legacy::{rpc_methods::TransactionStatus, LegacyRpcMethods},
		rpc::RpcClient,
	},
	dynamic::Value,
	ext::subxt_rpcs::client::RpcSubscription,
	tx::DynamicPayload,
	Metadata,
};
use subxt_core::client::ClientState;
use subxt_signer::sr25519::Keypair;

const LOG_TARGET: &str = "data-avail::rpc";

/// Highest metadata version this client decodes.
const METADATA_VERSION: u32 = 15;

/// Chain client talking to a node over JSON-RPC.
#[derive(Clone)]
pub struct RpcChainClient {
	rpc: LegacyRpcMethods<AvailConfig>,
}

impl RpcChainClient {
	/// Connect to the node at `url`.
	pub async fn from_url(url: &str) -> Result<Self> {
		tracing::info!(target: LOG_TARGET, "Connecting to node at: {url}");
		let rpc_client = RpcClient::from_url(url).await?;
		tracing::info!(target: LOG_TARGET, "Connected to node at: {url}");
		Ok(Self::from_rpc_client(rpc_client))
	}

	/// Connect to the endpoint named in `config`.
	pub async fn from_config(config: &ClientConfig) -> Result<Self> {
		config.validate()?;
		Self::from_url(&config.endpoint).await
	}

	/// Wrap an existing RPC client.
	pub fn from_rpc_client(rpc_client: RpcClient) -> Self {
		Self { rpc: LegacyRpcMethods::<AvailConfig>::new(rpc_client) }
	}

	/// Underlying legacy RPC methods.
	pub fn rpc(&self) -> &LegacyRpcMethods<AvailConfig> {
		&self.rpc
	}

	async fn metadata_at_version(&self) -> Result<Option<Metadata>> {
		let bytes = self
			.rpc
			.state_call("Metadata_metadata_at_version", Some(&METADATA_VERSION.encode()), None)
			.await?;
		let Some(opaque) = Option::<Vec<u8>>::decode(&mut &bytes[..])? else {
			return Ok(None);
		};
		Ok(Some(Metadata::decode(&mut &opaque[..])?))
	}
}

#[async_trait::async_trait]
impl ChainClient for RpcChainClient {
	type Metadata = Metadata;
	type Call = DynamicPayload;
	type Subscription = RpcStatusSubscription;

	async fn block_hash(&self, number: u32) -> Result<BlockHash> {
		self.rpc
			.chain_get_block_hash(Some(number.into()))
			.await?
			.ok_or(Error::BlockNotFound(number))
	}

	async fn runtime_version(&self) -> Result<RuntimeVersion> {
		let version = self.rpc.state_get_runtime_version(None).await?;
		Ok(RuntimeVersion {
			spec_version: version.spec_version,
			transaction_version: version.transaction_version,
		})
	}

	async fn metadata(&self) -> Result<Metadata> {
		match self.metadata_at_version().await {
			Ok(Some(metadata)) => return Ok(metadata),
			Ok(None) => {
				tracing::debug!(target: LOG_TARGET, "Metadata v{METADATA_VERSION} not available")
			},
			Err(e) => {
				tracing::debug!(target: LOG_TARGET, "Versioned metadata call failed: {e}")
			},
		}
		let bytes = self.rpc.state_call("Metadata_metadata", None, None).await?;
		let opaque = Vec::<u8>::decode(&mut &bytes[..])?;
		Ok(Metadata::decode(&mut &opaque[..])?)
	}

	fn storage_key(
		&self,
		metadata: &Metadata,
		pallet: &str,
		entry: &str,
		key: &[u8],
	) -> Result<Vec<u8>> {
		let address = subxt::dynamic::storage(pallet, entry, vec![Value::from_bytes(key)]);
		let key = subxt_core::storage::get_address_bytes(&address, metadata)
			.map_err(subxt::Error::from)?;
		Ok(key)
	}

	async fn storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
		let data = self.rpc.state_get_storage(key, None).await?;
		Ok(data.map(|data| data.to_vec()))
	}

	fn new_call(
		&self,
		metadata: &Metadata,
		pallet: &str,
		call: &str,
		payload: Vec<u8>,
	) -> Result<DynamicPayload> {
		if metadata.pallet_by_name(pallet).and_then(|p| p.call_variant_by_name(call)).is_none() {
			return Err(Error::CallNotFound { pallet: pallet.into(), call: call.into() });
		}
		Ok(subxt::dynamic::tx(pallet, call, vec![Value::from_bytes(payload)]))
	}

	fn sign(
		&self,
		metadata: &Metadata,
		call: &DynamicPayload,
		signer: &Keypair,
		options: &SignatureOptions,
	) -> Result<Vec<u8>> {
		let state = ClientState::<AvailConfig> {
			metadata: metadata.clone(),
			genesis_hash: options.genesis_hash,
			runtime_version: subxt_core::client::RuntimeVersion {
				spec_version: options.spec_version,
				transaction_version: options.transaction_version,
			},
		};
		let params = AvailExtrinsicParamsBuilder::new()
			.immortal()
			.nonce(options.nonce)
			.tip(options.tip)
			.app_id(options.app_id)
			.build();

		let partial = subxt_core::tx::create_v4_signed(call, &state, params)
			.map_err(|e| Error::Signing(Box::new(subxt::Error::from(e))))?;
		Ok(partial.sign(signer).into_encoded())
	}

	async fn submit_and_watch(&self, extrinsic: Vec<u8>) -> Result<RpcStatusSubscription> {
		let subscription = self.rpc.author_submit_and_watch_extrinsic(&extrinsic).await?;
		Ok(RpcStatusSubscription { inner: Some(subscription) })
	}

	async fn block_extrinsics(&self, block: BlockHash) -> Result<Vec<Vec<u8>>> {
		let details = self
			.rpc
			.chain_get_block(Some(block))
			.await?
			.ok_or(Error::UnknownBlock(block))?;
		Ok(details.block.extrinsics.iter().map(|xt| xt.to_vec()).collect())
	}
}

/// Status stream of an `author_submitAndWatchExtrinsic` subscription.
pub struct RpcStatusSubscription {
	inner: Option<RpcSubscription<TransactionStatus<BlockHash>>>,
}

#[async_trait::async_trait]
impl StatusSubscription for RpcStatusSubscription {
	async fn next_status(&mut self) -> Option<Result<TxStatus>> {
		let status = self.inner.as_mut()?.next().await?;
		Some(status.map(TxStatus::from).map_err(Error::from))
	}

	fn unsubscribe(&mut self) {
		// Dropping the subscription sends the unsubscribe request.
		self.inner.take();
	}
}

impl From<TransactionStatus<BlockHash>> for TxStatus {
	fn from(status: TransactionStatus<BlockHash>) -> Self {
		match status {
			TransactionStatus::Future => TxStatus::Future,
			TransactionStatus::Ready => TxStatus::Ready,
			TransactionStatus::Broadcast(peers) => TxStatus::Broadcast(peers),
			TransactionStatus::InBlock(hash) => TxStatus::InBlock(hash),
			TransactionStatus::Retracted(hash) => TxStatus::Retracted(hash),
			TransactionStatus::FinalityTimeout(hash) => TxStatus::FinalityTimeout(hash),
			TransactionStatus::Finalized(hash) => TxStatus::Finalized(hash),
			TransactionStatus::Usurped(hash) => TxStatus::Usurped(hash),
			TransactionStatus::Dropped => TxStatus::Dropped,
			TransactionStatus::Invalid => TxStatus::Invalid,
		}
	}
}
