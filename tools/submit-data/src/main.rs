// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Submit data to a data availability chain.
//!
//! ## Usage
//!
//!   submit-data --ws ws://127.0.0.1:9944 --seed "//Alice" --app-id 0 --data 0xab1234

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use data_avail_sdk::{
	AppId, ClientConfig, RpcChainClient, Submitter, UnknownAccountPolicy, WaitFor,
};
use std::{str::FromStr, time::Duration};
use subxt_signer::sr25519::Keypair;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "submit-data")]
#[command(about = "Submit data to a data availability chain")]
struct Args {
	/// WebSocket URL of the node
	#[arg(long, env = "AVAIL_WS", default_value = data_avail_sdk::config::DEFAULT_ENDPOINT)]
	ws: String,

	/// Seed phrase or dev seed (e.g., "//Alice" or mnemonic)
	#[arg(long, env = "AVAIL_SEED", default_value = "//Alice")]
	seed: String,

	/// Application id to tag the submission with
	#[arg(long, env = "AVAIL_APP_ID", default_value_t = 0)]
	app_id: u32,

	/// Hex-encoded payload, with or without a 0x prefix
	#[arg(long)]
	data: String,

	/// Wait for finalization instead of block inclusion
	#[arg(long)]
	finalized: bool,

	/// Seconds to wait for inclusion before giving up
	#[arg(long, default_value_t = 120)]
	timeout_secs: u64,

	/// Sign with nonce 0 when the account has no on-chain entry
	#[arg(long)]
	assume_zero_nonce: bool,
}

impl Args {
	fn client_config(&self) -> ClientConfig {
		let wait_for = if self.finalized { WaitFor::Finalized } else { WaitFor::InBlock };
		let unknown_account = if self.assume_zero_nonce {
			UnknownAccountPolicy::AssumeZeroNonce
		} else {
			UnknownAccountPolicy::Reject
		};
		ClientConfig::default()
			.with_endpoint(self.ws.clone())
			.with_inclusion_timeout(Duration::from_secs(self.timeout_secs))
			.with_wait_for(wait_for)
			.with_unknown_account(unknown_account)
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let subscriber = FmtSubscriber::builder()
		.with_max_level(Level::INFO)
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.finish();
	tracing::subscriber::set_global_default(subscriber)
		.context("Failed to set tracing subscriber")?;

	let args = Args::parse();
	let config = args.client_config();

	let keypair = keypair_from_seed(&args.seed)?;
	let payload = decode_payload(&args.data)?;

	let client = RpcChainClient::from_config(&config)
		.await
		.with_context(|| format!("Failed to connect to {}", config.endpoint))?;
	let submitter = Submitter::with_config(client, config)?;

	info!("Submitting {} bytes with app id {}", payload.len(), args.app_id);
	let id = submitter
		.submit_data(&keypair, AppId(args.app_id), payload)
		.await
		.context("Submission failed")?;

	info!("Included at block {:?}, index {}", id.block, id.index);
	println!("{id}");
	Ok(())
}

fn decode_payload(data: &str) -> Result<Vec<u8>> {
	let data = data.strip_prefix("0x").unwrap_or(data);
	hex::decode(data).map_err(|e| anyhow!("Invalid hex payload: {e}"))
}

fn keypair_from_seed(seed: &str) -> Result<Keypair> {
	if seed.starts_with("//") {
		let uri = subxt_signer::SecretUri::from_str(seed)
			.map_err(|e| anyhow!("Failed to parse secret URI: {e}"))?;
		let keypair =
			Keypair::from_uri(&uri).map_err(|e| anyhow!("Failed to create keypair: {e}"))?;
		Ok(keypair)
	} else {
		let mnemonic = subxt_signer::bip39::Mnemonic::from_str(seed)
			.map_err(|e| anyhow!("Failed to parse mnemonic: {e}"))?;
		let keypair = Keypair::from_phrase(&mnemonic, None)
			.map_err(|e| anyhow!("Failed to create keypair from mnemonic: {e}"))?;
		Ok(keypair)
	}
}
