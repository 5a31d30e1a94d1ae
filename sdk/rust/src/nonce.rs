// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Account nonce lookup and per-account submission ordering.

use crate::{
	chain::ChainClient,
	config::UnknownAccountPolicy,
	types::{Error, Result},
};
use codec::Decode;
use std::{
	collections::HashMap,
	sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError},
};
use subxt::utils::AccountId32;
use tokio::sync::{Mutex, OwnedMutexGuard};

const LOG_TARGET: &str = "data-avail::nonce";

/// Pallet holding account information.
pub const SYSTEM_PALLET: &str = "System";
/// Storage map from account id to account information.
pub const ACCOUNT_ENTRY: &str = "Account";

/// Leading fields of `frame_system::AccountInfo`.
///
/// The balance data that follows depends on the runtime and is left undecoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Decode)]
pub struct AccountInfoHeader {
	pub nonce: u32,
	pub consumers: u32,
	pub providers: u32,
	pub sufficients: u32,
}

/// Decode the nonce from an encoded `AccountInfo`.
pub fn decode_nonce(mut encoded: &[u8]) -> Result<u64> {
	let header = AccountInfoHeader::decode(&mut encoded)?;
	Ok(header.nonce.into())
}

/// Read the current nonce of `account` from `System.Account`.
pub async fn fetch_nonce<C: ChainClient>(
	client: &C,
	metadata: &C::Metadata,
	account: &[u8; 32],
	policy: UnknownAccountPolicy,
) -> Result<u64> {
	let key = client.storage_key(metadata, SYSTEM_PALLET, ACCOUNT_ENTRY, account)?;
	match client.storage(&key).await? {
		Some(encoded) => decode_nonce(&encoded),
		None => match policy {
			UnknownAccountPolicy::Reject =>
				Err(Error::AccountNotFound(AccountId32::from(*account).to_string())),
			UnknownAccountPolicy::AssumeZeroNonce => {
				tracing::warn!(
					target: LOG_TARGET,
					account = %AccountId32::from(*account),
					"No account entry, assuming nonce 0",
				);
				Ok(0)
			},
		},
	}
}

type LockTable = HashMap<[u8; 32], Arc<Mutex<()>>>;

/// Held while an account has a submission in flight.
///
/// Dropping the last permit for an account removes the account from its
/// [`IdentityLocks`] table.
#[derive(Debug)]
pub struct IdentityPermit {
	guard: OwnedMutexGuard<()>,
	account: [u8; 32],
	table: Arc<StdMutex<LockTable>>,
}

impl Drop for IdentityPermit {
	fn drop(&mut self) {
		let mut table = lock_table(&self.table);
		// One reference in the table, one in our guard; any more are waiters.
		if Arc::strong_count(OwnedMutexGuard::mutex(&self.guard)) <= 2 {
			table.remove(&self.account);
		}
	}
}

/// One lock per signing account.
///
/// A submission holds its account's permit from the nonce read until it is
/// included or fails, so concurrent submissions from one account never sign
/// with the same nonce. Different accounts do not contend. Only accounts with
/// a submission in flight or waiting have an entry.
#[derive(Debug, Default, Clone)]
pub struct IdentityLocks {
	table: Arc<StdMutex<LockTable>>,
}

impl IdentityLocks {
	pub fn new() -> Self {
		Self::default()
	}

	/// Wait until `account` has no other submission in flight.
	pub async fn acquire(&self, account: &[u8; 32]) -> IdentityPermit {
		let lock = {
			let mut table = lock_table(&self.table);
			// Entries left behind by cancelled waiters.
			table.retain(|_, lock| Arc::strong_count(lock) > 1);
			table.entry(*account).or_default().clone()
		};
		let guard = lock.lock_owned().await;
		IdentityPermit { guard, account: *account, table: self.table.clone() }
	}

	/// Number of accounts with a submission in flight or waiting.
	pub fn len(&self) -> usize {
		lock_table(&self.table).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

fn lock_table(table: &StdMutex<LockTable>) -> MutexGuard<'_, LockTable> {
	table.lock().unwrap_or_else(PoisonError::into_inner)
}
