// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Mock chain client for testing without a running node.
//!
//! [`MockChainClient`] keeps a tiny in-memory chain: a genesis hash, a runtime
//! version, the set of calls its "metadata" knows, and account nonces. Submitted
//! extrinsics bump the signer's nonce, and every status stream plays back a
//! configurable script. All operations are recorded so tests can check what the
//! submission flow asked for and in which order.

use crate::{
	chain::{ChainClient, StatusSubscription},
	config::{DATA_AVAILABILITY_PALLET, SUBMIT_DATA_CALL},
	types::{AppId, BlockHash, Error, Result, RuntimeVersion, SignatureOptions, TxStatus},
};
use codec::{Decode, Encode};
use std::{
	collections::{HashMap, VecDeque},
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, Mutex, MutexGuard, PoisonError,
	},
};
use subxt::{ext::subxt_rpcs::Error as RpcError, utils::H256};
use subxt_signer::sr25519::Keypair;

/// Step of a scripted status stream.
#[derive(Debug, Clone)]
pub enum ScriptedStatus {
	/// Yield this status.
	Status(TxStatus),
	/// Yield an RPC client error with this message.
	Error(String),
	/// Never yield anything again.
	Stall,
}

/// Configuration for the mock chain client.
#[derive(Debug, Clone)]
pub struct MockChainConfig {
	/// Hash returned for block #0 (default: zero hash).
	pub genesis_hash: BlockHash,
	/// Runtime spec version (default: 1).
	pub spec_version: u32,
	/// Runtime transaction version (default: 1).
	pub transaction_version: u32,
	/// Calls present in the metadata (default: `DataAvailability.submit_data`).
	pub calls: Vec<(String, String)>,
	/// Status stream replayed for every submission
	/// (default: `Broadcast`, then `InBlock(0x1111..)`).
	pub script: Vec<ScriptedStatus>,
	/// Extrinsics placed before the submitted one in every block body (default: 0).
	/// `None` leaves the submitted extrinsic out of the body.
	pub extrinsic_position: Option<usize>,
	/// Simulate failures reading the genesis hash (for testing error paths).
	pub simulate_genesis_failure: bool,
	/// Simulate runtime version read failures (for testing error paths).
	pub simulate_runtime_version_failure: bool,
	/// Simulate metadata fetch failures (for testing error paths).
	pub simulate_metadata_failure: bool,
	/// Simulate storage read failures (for testing error paths).
	pub simulate_storage_failure: bool,
	/// Simulate signing failures (for testing error paths).
	pub simulate_signing_failure: bool,
	/// Simulate the node rejecting the watch request (for testing error paths).
	pub simulate_submit_failure: bool,
	/// Simulate the node not knowing the including block (for testing error paths).
	pub simulate_missing_block: bool,
}

impl Default for MockChainConfig {
	fn default() -> Self {
		Self {
			genesis_hash: H256::zero(),
			spec_version: 1,
			transaction_version: 1,
			calls: vec![(DATA_AVAILABILITY_PALLET.into(), SUBMIT_DATA_CALL.into())],
			script: vec![
				ScriptedStatus::Status(TxStatus::Broadcast(vec!["12D3KooWmock".into()])),
				ScriptedStatus::Status(TxStatus::InBlock(H256::repeat_byte(0x11))),
			],
			extrinsic_position: Some(0),
			simulate_genesis_failure: false,
			simulate_runtime_version_failure: false,
			simulate_metadata_failure: false,
			simulate_storage_failure: false,
			simulate_signing_failure: false,
			simulate_submit_failure: false,
			simulate_missing_block: false,
		}
	}
}

/// Record of a mock operation performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
	BlockHash(u32),
	RuntimeVersion,
	Metadata,
	Storage { key: Vec<u8> },
	Sign { signer: [u8; 32], options: SignatureOptions },
	Submit { signer: [u8; 32], nonce: u64, payload: Vec<u8> },
	BlockExtrinsics(BlockHash),
}

/// Metadata of the mock chain: just the calls it knows.
#[derive(Debug, Clone)]
pub struct MockMetadata {
	calls: Vec<(String, String)>,
}

impl MockMetadata {
	pub fn has_call(&self, pallet: &str, call: &str) -> bool {
		self.calls.iter().any(|(p, c)| p == pallet && c == call)
	}
}

/// Call built against [`MockMetadata`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
	pub pallet: String,
	pub call: String,
	pub payload: Vec<u8>,
}

/// Extrinsic encoding used by the mock chain.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct MockExtrinsic {
	pub signer: [u8; 32],
	pub nonce: u64,
	pub app_id: AppId,
	pub payload: Vec<u8>,
}

#[derive(Debug, Default)]
struct MockState {
	nonces: HashMap<[u8; 32], u32>,
	submitted: Vec<Vec<u8>>,
	operations: Vec<MockOperation>,
}

/// Mock chain client for testing.
///
/// # Example
///
/// ```ignore
/// use data_avail_sdk::{AppId, MockChainClient, Submitter};
/// use subxt_signer::sr25519::dev;
///
/// let client = MockChainClient::new().with_account(&dev::alice(), 0);
/// let submitter = Submitter::new(client.clone());
///
/// let id = submitter.submit_data(&dev::alice(), AppId(0), vec![0xab]).await?;
/// assert_eq!(client.unsubscribe_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockChainClient {
	/// Client configuration.
	pub config: MockChainConfig,
	state: Arc<Mutex<MockState>>,
	unsubscribes: Arc<AtomicUsize>,
}

impl Default for MockChainClient {
	fn default() -> Self {
		Self::new()
	}
}

impl MockChainClient {
	/// Create a new mock client with default configuration.
	pub fn new() -> Self {
		Self::with_config(MockChainConfig::default())
	}

	/// Create a mock client with custom configuration.
	pub fn with_config(config: MockChainConfig) -> Self {
		Self {
			config,
			state: Arc::new(Mutex::new(MockState::default())),
			unsubscribes: Arc::new(AtomicUsize::new(0)),
		}
	}

	/// Register an account entry for `signer` with the given nonce.
	pub fn with_account(self, signer: &Keypair, nonce: u32) -> Self {
		self.set_nonce(signer, nonce);
		self
	}

	/// Replace the status script.
	pub fn with_script(mut self, script: Vec<ScriptedStatus>) -> Self {
		self.config.script = script;
		self
	}

	/// Drop `DataAvailability.submit_data` from the metadata.
	pub fn without_submit_data(mut self) -> Self {
		self.config
			.calls
			.retain(|(p, c)| !(p == DATA_AVAILABILITY_PALLET && c == SUBMIT_DATA_CALL));
		self
	}

	/// Set the on-chain nonce of `signer`.
	pub fn set_nonce(&self, signer: &Keypair, nonce: u32) {
		self.state().nonces.insert(signer.public_key().0, nonce);
	}

	/// Current on-chain nonce of `signer`, `None` if the account has no entry.
	pub fn nonce(&self, signer: &Keypair) -> Option<u32> {
		self.state().nonces.get(&signer.public_key().0).copied()
	}

	/// Get all operations performed by this client.
	pub fn operations(&self) -> Vec<MockOperation> {
		self.state().operations.clone()
	}

	/// Clear recorded operations.
	pub fn clear_operations(&self) {
		self.state().operations.clear();
	}

	/// Signature options of every signing request, in order.
	pub fn signed_options(&self) -> Vec<SignatureOptions> {
		self.operations()
			.into_iter()
			.filter_map(|op| match op {
				MockOperation::Sign { options, .. } => Some(options),
				_ => None,
			})
			.collect()
	}

	/// Number of times a status subscription was released.
	pub fn unsubscribe_count(&self) -> usize {
		self.unsubscribes.load(Ordering::SeqCst)
	}

	fn state(&self) -> MutexGuard<'_, MockState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn record(&self, op: MockOperation) {
		self.state().operations.push(op);
	}
}

const ACCOUNT_PREFIX: &[u8] = b"System.Account:";

/// Error a node connection would surface for a failed request.
fn client_error(message: impl Into<String>) -> Error {
	Error::Rpc(RpcError::Client(std::io::Error::other(message.into()).into()))
}

#[async_trait::async_trait]
impl ChainClient for MockChainClient {
	type Metadata = MockMetadata;
	type Call = MockCall;
	type Subscription = MockSubscription;

	async fn block_hash(&self, number: u32) -> Result<BlockHash> {
		self.record(MockOperation::BlockHash(number));
		if self.config.simulate_genesis_failure {
			return Err(client_error("Simulated genesis hash failure"));
		}
		match number {
			0 => Ok(self.config.genesis_hash),
			n => Err(Error::BlockNotFound(n)),
		}
	}

	async fn runtime_version(&self) -> Result<RuntimeVersion> {
		self.record(MockOperation::RuntimeVersion);
		if self.config.simulate_runtime_version_failure {
			return Err(client_error("Simulated runtime version failure"));
		}
		Ok(RuntimeVersion {
			spec_version: self.config.spec_version,
			transaction_version: self.config.transaction_version,
		})
	}

	async fn metadata(&self) -> Result<MockMetadata> {
		self.record(MockOperation::Metadata);
		if self.config.simulate_metadata_failure {
			return Err(client_error("Simulated metadata failure"));
		}
		Ok(MockMetadata { calls: self.config.calls.clone() })
	}

	fn storage_key(
		&self,
		_metadata: &MockMetadata,
		pallet: &str,
		entry: &str,
		key: &[u8],
	) -> Result<Vec<u8>> {
		Ok([pallet.as_bytes(), b".", entry.as_bytes(), b":", key].concat())
	}

	async fn storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
		self.record(MockOperation::Storage { key: key.to_vec() });
		// Lets concurrent submissions interleave between the read and the submit.
		tokio::task::yield_now().await;

		if self.config.simulate_storage_failure {
			return Err(client_error("Simulated storage failure"));
		}
		let Some(account) = key.strip_prefix(ACCOUNT_PREFIX) else {
			return Ok(None);
		};
		let Ok(account) = <[u8; 32]>::try_from(account) else {
			return Ok(None);
		};
		// nonce, consumers, providers, sufficients, then free/reserved/frozen/flags
		Ok(self
			.state()
			.nonces
			.get(&account)
			.map(|nonce| (*nonce, 0u32, 1u32, 0u32, [0u128; 4]).encode()))
	}

	fn new_call(
		&self,
		metadata: &MockMetadata,
		pallet: &str,
		call: &str,
		payload: Vec<u8>,
	) -> Result<MockCall> {
		if !metadata.has_call(pallet, call) {
			return Err(Error::CallNotFound { pallet: pallet.into(), call: call.into() });
		}
		Ok(MockCall { pallet: pallet.into(), call: call.into(), payload })
	}

	fn sign(
		&self,
		_metadata: &MockMetadata,
		call: &MockCall,
		signer: &Keypair,
		options: &SignatureOptions,
	) -> Result<Vec<u8>> {
		let signer = signer.public_key().0;
		self.record(MockOperation::Sign { signer, options: options.clone() });

		if self.config.simulate_signing_failure {
			return Err(Error::Signing("Simulated signing failure".into()));
		}
		Ok(MockExtrinsic {
			signer,
			nonce: options.nonce,
			app_id: options.app_id,
			payload: call.payload.clone(),
		}
		.encode())
	}

	async fn submit_and_watch(&self, extrinsic: Vec<u8>) -> Result<MockSubscription> {
		if self.config.simulate_submit_failure {
			return Err(client_error("Simulated submit failure"));
		}
		let xt = MockExtrinsic::decode(&mut &extrinsic[..])?;
		{
			let mut state = self.state();
			state.operations.push(MockOperation::Submit {
				signer: xt.signer,
				nonce: xt.nonce,
				payload: xt.payload.clone(),
			});
			let nonce = state.nonces.entry(xt.signer).or_insert(0);
			if u64::from(*nonce) == xt.nonce {
				*nonce += 1;
			}
			state.submitted.push(extrinsic);
		}
		Ok(MockSubscription {
			script: self.config.script.iter().cloned().collect(),
			unsubscribes: self.unsubscribes.clone(),
		})
	}

	async fn block_extrinsics(&self, block: BlockHash) -> Result<Vec<Vec<u8>>> {
		self.record(MockOperation::BlockExtrinsics(block));
		if self.config.simulate_missing_block {
			return Err(Error::UnknownBlock(block));
		}
		let state = self.state();
		let position = self.config.extrinsic_position;
		let mut body = vec![vec![0xff]; position.unwrap_or(1)];
		if let (Some(position), Some(xt)) = (position, state.submitted.last()) {
			body.insert(position, xt.clone());
		}
		Ok(body)
	}
}

/// Status stream replaying a [`ScriptedStatus`] list.
pub struct MockSubscription {
	script: VecDeque<ScriptedStatus>,
	unsubscribes: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl StatusSubscription for MockSubscription {
	async fn next_status(&mut self) -> Option<Result<TxStatus>> {
		match self.script.pop_front()? {
			ScriptedStatus::Status(status) => Some(Ok(status)),
			ScriptedStatus::Error(message) => Some(Err(client_error(message))),
			ScriptedStatus::Stall => std::future::pending().await,
		}
	}

	fn unsubscribe(&mut self) {
		self.unsubscribes.fetch_add(1, Ordering::SeqCst);
		self.script.clear();
	}
}
