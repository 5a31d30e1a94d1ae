// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! # Data Availability SDK for Rust
//!
//! Client SDK for submitting opaque data to a Substrate data availability chain
//! through its `DataAvailability.submit_data` call, then waiting for the extrinsic
//! to be included in a block.
//!
//! ## Features
//!
//! - **Fresh parameters**: genesis hash, runtime version and nonce are read from the
//!   chain for every submission
//! - **Application ids**: the `CheckAppId` transaction extension is filled in for you
//! - **Bounded waits**: inclusion is awaited under a timeout; dropped, invalid and
//!   usurped extrinsics surface as typed errors
//! - **Per-account ordering**: concurrent submissions from one account are serialized
//! - **Mock client**: exercise the full flow without a node
//!
//! ## Usage
//!
//! ```ignore
//! use data_avail_sdk::prelude::*;
//! use subxt_signer::sr25519::dev;
//!
//! let client = RpcChainClient::from_url("ws://127.0.0.1:9944").await?;
//! let submitter = Submitter::new(client);
//!
//! let id = submitter.submit_data(&dev::alice(), AppId(0), vec![0xab, 0x12, 0x34]).await?;
//! println!("Included as {id}");
//! ```
//!
//! ### Driving the subscription yourself
//!
//! ```ignore
//! let metadata = client.metadata().await?;
//! let call = client.new_call(&metadata, "DataAvailability", "submit_data", data)?;
//! let mut submission = submitter.sign_and_send(&metadata, &signer, AppId(1), call).await?;
//!
//! while let Some(status) = submission.next_status().await {
//!     println!("{:?}", status?);
//! }
//! // The subscription is released when `submission` is dropped.
//! ```
//!
//! ### Testing without a node
//!
//! ```ignore
//! use data_avail_sdk::{MockChainClient, Submitter};
//!
//! let client = MockChainClient::new().with_account(&dev::alice(), 0);
//! let submitter = Submitter::new(client.clone());
//! submitter.submit_data(&dev::alice(), AppId(0), vec![1, 2, 3]).await?;
//! assert_eq!(client.signed_options()[0].nonce, 0);
//! ```

pub mod chain;
pub mod config;
pub mod mock_client;
pub mod nonce;
pub mod rpc_client;
pub mod submit;
pub mod subxt_config;
pub mod types;

pub use chain::{ChainClient, StatusSubscription};
pub use config::{ClientConfig, UnknownAccountPolicy, WaitFor};
pub use mock_client::{MockChainClient, MockChainConfig, MockOperation, ScriptedStatus};
pub use rpc_client::RpcChainClient;
pub use submit::{Submission, Submitter};
pub use subxt_config::AvailConfig;
pub use types::{
	AppId, BlockHash, Error, ExtrinsicId, Result, RuntimeVersion, SignatureOptions, TxStatus,
};

/// Prelude module for convenient imports.
pub mod prelude {
	pub use crate::{
		chain::{ChainClient, StatusSubscription},
		config::{ClientConfig, UnknownAccountPolicy, WaitFor},
		rpc_client::RpcChainClient,
		submit::{Submission, Submitter},
		types::{AppId, BlockHash, Error, ExtrinsicId, Result, SignatureOptions, TxStatus},
	};
}
