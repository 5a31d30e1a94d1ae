// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Signing, submission and inclusion tracking.
//!
//! [`Submitter::submit_data`] turns a payload into a signed `submit_data` extrinsic,
//! sends it, and waits until it shows up in a block. Every submission reads the
//! genesis hash, runtime version and account nonce afresh; nothing is cached between
//! calls.

use crate::{
	chain::{ChainClient, StatusSubscription},
	config::{ClientConfig, WaitFor},
	nonce::{fetch_nonce, IdentityLocks, IdentityPermit},
	types::{AppId, BlockHash, Error, ExtrinsicId, Result, SignatureOptions, TxStatus},
};
use core::time::Duration;
use subxt_signer::sr25519::Keypair;

const LOG_TARGET: &str = "data-avail::submit";

/// A submitted extrinsic and its status subscription.
///
/// The subscription is released exactly once: on [`Submission::release`] or on drop,
/// whichever comes first. The signer's identity permit is held until then.
pub struct Submission<S: StatusSubscription> {
	subscription: S,
	extrinsic: Vec<u8>,
	released: bool,
	_permit: IdentityPermit,
}

impl<S: StatusSubscription> Submission<S> {
	/// Encoded extrinsic as it was submitted.
	pub fn extrinsic(&self) -> &[u8] {
		&self.extrinsic
	}

	/// Next status update, `None` once the stream is closed or released.
	pub async fn next_status(&mut self) -> Option<Result<TxStatus>> {
		if self.released {
			return None;
		}
		self.subscription.next_status().await
	}

	/// Release the subscription. Further calls are no-ops.
	pub fn release(&mut self) {
		if !self.released {
			self.released = true;
			self.subscription.unsubscribe();
		}
	}
}

impl<S: StatusSubscription> Drop for Submission<S> {
	fn drop(&mut self) {
		self.release();
	}
}

/// Submits data to the chain through a [`ChainClient`].
pub struct Submitter<C: ChainClient> {
	client: C,
	config: ClientConfig,
	locks: IdentityLocks,
}

impl<C: ChainClient> Submitter<C> {
	/// Create a submitter with the default configuration.
	pub fn new(client: C) -> Self {
		Self { client, config: ClientConfig::default(), locks: IdentityLocks::new() }
	}

	/// Create a submitter with a custom configuration.
	pub fn with_config(client: C, config: ClientConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self { client, config, locks: IdentityLocks::new() })
	}

	/// Underlying chain client.
	pub fn client(&self) -> &C {
		&self.client
	}

	/// Active configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Sign `call` with fresh chain parameters and submit it.
	///
	/// Waits for any other in-flight submission from the same signer first. The
	/// returned [`Submission`] keeps that ordering until it is released.
	pub async fn sign_and_send(
		&self,
		metadata: &C::Metadata,
		signer: &Keypair,
		app_id: AppId,
		call: C::Call,
	) -> Result<Submission<C::Subscription>> {
		let permit = self.locks.acquire(&signer.public_key().0).await;
		self.sign_and_send_with(permit, metadata, signer, app_id, call).await
	}

	async fn sign_and_send_with(
		&self,
		permit: IdentityPermit,
		metadata: &C::Metadata,
		signer: &Keypair,
		app_id: AppId,
		call: C::Call,
	) -> Result<Submission<C::Subscription>> {
		let genesis_hash = self.client.block_hash(0).await?;
		let runtime = self.client.runtime_version().await?;
		let nonce = fetch_nonce(
			&self.client,
			metadata,
			&signer.public_key().0,
			self.config.unknown_account,
		)
		.await?;

		let options = SignatureOptions {
			genesis_hash,
			nonce,
			spec_version: runtime.spec_version,
			transaction_version: runtime.transaction_version,
			tip: 0,
			app_id,
		};
		tracing::debug!(target: LOG_TARGET, ?options, "Signing extrinsic");

		let extrinsic = self.client.sign(metadata, &call, signer, &options)?;
		let subscription = self.client.submit_and_watch(extrinsic.clone()).await?;

		Ok(Submission { subscription, extrinsic, released: false, _permit: permit })
	}

	/// Submit `payload` as a `submit_data` extrinsic and wait for inclusion.
	///
	/// Returns the including block (as reported by the status event) and the
	/// extrinsic's position in that block.
	pub async fn submit_data(
		&self,
		signer: &Keypair,
		app_id: AppId,
		payload: Vec<u8>,
	) -> Result<ExtrinsicId> {
		let permit = self.locks.acquire(&signer.public_key().0).await;

		let metadata = self.client.metadata().await?;
		let call =
			self.client.new_call(&metadata, &self.config.pallet, &self.config.call, payload)?;

		let mut submission =
			self.sign_and_send_with(permit, &metadata, signer, app_id, call).await?;

		let block = wait_for_inclusion(
			&mut submission,
			self.config.wait_for,
			self.config.inclusion_timeout,
		)
		.await;
		submission.release();
		let block = block?;

		let index = self.extrinsic_index(block, submission.extrinsic()).await?;
		Ok(ExtrinsicId { block, index })
	}

	async fn extrinsic_index(&self, block: BlockHash, extrinsic: &[u8]) -> Result<u32> {
		let extrinsics = self.client.block_extrinsics(block).await?;
		extrinsics
			.iter()
			.position(|xt| xt.as_slice() == extrinsic)
			.map(|index| index as u32)
			.ok_or(Error::ExtrinsicNotInBlock(block))
	}
}

/// Drive `submission` until it reaches `wait_for` or fails, bounded by `timeout`.
pub async fn wait_for_inclusion<S: StatusSubscription>(
	submission: &mut Submission<S>,
	wait_for: WaitFor,
	timeout: Duration,
) -> Result<BlockHash> {
	match tokio::time::timeout(timeout, watch(submission, wait_for)).await {
		Ok(result) => result,
		Err(_) => {
			tracing::warn!(target: LOG_TARGET, ?timeout, "Gave up waiting for inclusion");
			Err(Error::InclusionTimeout(timeout))
		},
	}
}

async fn watch<S: StatusSubscription>(
	submission: &mut Submission<S>,
	wait_for: WaitFor,
) -> Result<BlockHash> {
	loop {
		let status = match submission.next_status().await {
			Some(Ok(status)) => status,
			Some(Err(e)) => return Err(e),
			None => return Err(Error::SubscriptionClosed),
		};
		tracing::info!(target: LOG_TARGET, ?status, "Transaction status");

		match status {
			TxStatus::Future | TxStatus::Ready | TxStatus::Broadcast(_) => {},
			TxStatus::InBlock(block) => {
				tracing::info!(target: LOG_TARGET, ?block, "Included in block");
				if wait_for == WaitFor::InBlock {
					return Ok(block);
				}
			},
			TxStatus::Retracted(block) => {
				tracing::warn!(target: LOG_TARGET, ?block, "Including block retracted");
			},
			TxStatus::Finalized(block) => {
				tracing::info!(target: LOG_TARGET, ?block, "Finalized in block");
				return Ok(block);
			},
			TxStatus::FinalityTimeout(block) => return Err(Error::FinalityTimeout(block)),
			TxStatus::Usurped(block) => return Err(Error::Usurped(block)),
			TxStatus::Dropped => return Err(Error::Dropped),
			TxStatus::Invalid => return Err(Error::Invalid),
		}
	}
}
