// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Client configuration.

use crate::types::{Error, Result};
use core::time::Duration;

/// Default node endpoint.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:9944";
/// Pallet exposing the data submission call.
pub const DATA_AVAILABILITY_PALLET: &str = "DataAvailability";
/// Data submission call name.
pub const SUBMIT_DATA_CALL: &str = "submit_data";

/// Status that completes a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaitFor {
	/// Return on the first `InBlock` status.
	#[default]
	InBlock,
	/// Keep waiting until the including block is finalized.
	Finalized,
}

/// What to do when `System.Account` has no entry for the signer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownAccountPolicy {
	/// Fail with [`Error::AccountNotFound`].
	#[default]
	Reject,
	/// Sign with nonce 0.
	AssumeZeroNonce,
}

/// Configuration for [`crate::Submitter`] and [`crate::RpcChainClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Node WebSocket endpoint (default: `ws://127.0.0.1:9944`).
	pub endpoint: String,
	/// Maximum time to wait for inclusion after submission (default: 120 s).
	pub inclusion_timeout: Duration,
	/// Status that completes a submission (default: `InBlock`).
	pub wait_for: WaitFor,
	/// Behaviour for signers without an account entry (default: `Reject`).
	pub unknown_account: UnknownAccountPolicy,
	/// Pallet holding the submission call (default: `DataAvailability`).
	pub pallet: String,
	/// Submission call name (default: `submit_data`).
	pub call: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.into(),
			inclusion_timeout: Duration::from_secs(120),
			wait_for: WaitFor::default(),
			unknown_account: UnknownAccountPolicy::default(),
			pallet: DATA_AVAILABILITY_PALLET.into(),
			call: SUBMIT_DATA_CALL.into(),
		}
	}
}

impl ClientConfig {
	/// Set the node endpoint.
	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = endpoint.into();
		self
	}

	/// Set the inclusion timeout.
	pub fn with_inclusion_timeout(mut self, timeout: Duration) -> Self {
		self.inclusion_timeout = timeout;
		self
	}

	/// Set the status that completes a submission.
	pub fn with_wait_for(mut self, wait_for: WaitFor) -> Self {
		self.wait_for = wait_for;
		self
	}

	/// Set the policy for signers without an account entry.
	pub fn with_unknown_account(mut self, policy: UnknownAccountPolicy) -> Self {
		self.unknown_account = policy;
		self
	}

	/// Override the pallet and call used for submissions.
	pub fn with_call(mut self, pallet: impl Into<String>, call: impl Into<String>) -> Self {
		self.pallet = pallet.into();
		self.call = call.into();
		self
	}

	/// Check the configuration for values that can never succeed.
	pub fn validate(&self) -> Result<()> {
		if self.endpoint.is_empty() {
			return Err(Error::InvalidConfig("endpoint must not be empty".into()));
		}
		if self.inclusion_timeout.is_zero() {
			return Err(Error::InvalidConfig("inclusion timeout must be non-zero".into()));
		}
		if self.pallet.is_empty() || self.call.is_empty() {
			return Err(Error::InvalidConfig("pallet and call names must not be empty".into()));
		}
		Ok(())
	}
}
