// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Integration tests for the data availability SDK
//!
//! Most tests drive the full submission flow against `MockChainClient`. Tests marked
//! `#[ignore]` require a running data availability node at ws://127.0.0.1:9944
//!
//! Run with: cargo test --test integration_tests -- --include-ignored --test-threads=1

use data_avail_sdk::{
	mock_client::MockChainConfig, prelude::*, MockChainClient, MockOperation, ScriptedStatus,
};
use std::time::Duration;
use subxt::utils::H256;
use subxt_signer::sr25519::dev;

fn in_block(byte: u8) -> ScriptedStatus {
	ScriptedStatus::Status(TxStatus::InBlock(H256::repeat_byte(byte)))
}

#[tokio::test]
async fn test_submit_data_end_to_end() -> Result<()> {
	let client = MockChainClient::new().with_account(&dev::alice(), 0).with_script(vec![
		ScriptedStatus::Status(TxStatus::Broadcast(vec!["peer".into()])),
		in_block(0x11),
	]);
	let submitter = Submitter::new(client.clone());

	let payload = hex::decode("ab1234").unwrap();
	let id = submitter.submit_data(&dev::alice(), AppId(0), payload.clone()).await?;

	assert_eq!(id, ExtrinsicId { block: H256::repeat_byte(0x11), index: 0 });

	let options = client.signed_options();
	assert_eq!(options.len(), 1);
	assert_eq!(options[0].genesis_hash, H256::zero());
	assert_eq!(options[0].block_hash(), H256::zero());
	assert_eq!(options[0].spec_version, 1);
	assert_eq!(options[0].nonce, 0);
	assert_eq!(options[0].tip, 0);
	assert_eq!(options[0].app_id, AppId(0));

	let submits: Vec<_> = client
		.operations()
		.into_iter()
		.filter(|op| matches!(op, MockOperation::Submit { .. }))
		.collect();
	assert_eq!(
		submits,
		vec![MockOperation::Submit { signer: dev::alice().public_key().0, nonce: 0, payload }]
	);
	assert_eq!(client.unsubscribe_count(), 1);
	Ok(())
}

#[tokio::test]
async fn test_submit_data_reads_chain_state_in_order() -> Result<()> {
	let client = MockChainClient::new().with_account(&dev::alice(), 0);
	let submitter = Submitter::new(client.clone());

	submitter.submit_data(&dev::alice(), AppId(0), vec![1]).await?;

	let ops = client.operations();
	assert_eq!(ops[0], MockOperation::Metadata);
	assert_eq!(ops[1], MockOperation::BlockHash(0));
	assert_eq!(ops[2], MockOperation::RuntimeVersion);
	assert!(matches!(ops[3], MockOperation::Storage { .. }));
	assert!(matches!(ops[4], MockOperation::Sign { .. }));
	assert!(matches!(ops[5], MockOperation::Submit { .. }));
	assert_eq!(ops[6], MockOperation::BlockExtrinsics(H256::repeat_byte(0x11)));
	Ok(())
}

#[tokio::test]
async fn test_parameters_refetched_per_submission() -> Result<()> {
	let client = MockChainClient::new().with_account(&dev::alice(), 0);
	let submitter = Submitter::new(client.clone());

	submitter.submit_data(&dev::alice(), AppId(0), vec![1]).await?;
	// Nonce moved on chain by someone else between the two calls.
	client.set_nonce(&dev::alice(), 9);
	submitter.submit_data(&dev::alice(), AppId(0), vec![2]).await?;

	let nonces: Vec<_> = client.signed_options().iter().map(|o| o.nonce).collect();
	assert_eq!(nonces, vec![0, 9]);

	let ops = client.operations();
	let genesis_reads = ops.iter().filter(|op| **op == MockOperation::BlockHash(0)).count();
	let version_reads = ops.iter().filter(|op| **op == MockOperation::RuntimeVersion).count();
	let metadata_reads = ops.iter().filter(|op| **op == MockOperation::Metadata).count();
	assert_eq!((genesis_reads, version_reads, metadata_reads), (2, 2, 2));
	Ok(())
}

#[tokio::test]
async fn test_app_id_is_signed() -> Result<()> {
	let client = MockChainClient::new().with_account(&dev::bob(), 4);
	let submitter = Submitter::new(client.clone());

	submitter.submit_data(&dev::bob(), AppId(7), vec![0xff]).await?;

	let options = &client.signed_options()[0];
	assert_eq!(options.app_id, AppId(7));
	assert_eq!(options.nonce, 4);
	Ok(())
}

#[tokio::test]
async fn test_event_block_hash_and_index_are_reported() -> Result<()> {
	let config = MockChainConfig { extrinsic_position: Some(3), ..Default::default() };
	let client = MockChainClient::with_config(config)
		.with_account(&dev::alice(), 0)
		.with_script(vec![in_block(0x5a)]);
	let submitter = Submitter::new(client);

	let id = submitter.submit_data(&dev::alice(), AppId(1), vec![1, 2, 3]).await?;
	assert_eq!(id, ExtrinsicId { block: H256::repeat_byte(0x5a), index: 3 });
	Ok(())
}

#[tokio::test]
async fn test_extrinsic_missing_from_block() {
	let config = MockChainConfig { extrinsic_position: None, ..Default::default() };
	let client = MockChainClient::with_config(config).with_account(&dev::alice(), 0);
	let submitter = Submitter::new(client.clone());

	let result = submitter.submit_data(&dev::alice(), AppId(0), vec![1]).await;
	assert!(matches!(
		result,
		Err(Error::ExtrinsicNotInBlock(hash)) if hash == H256::repeat_byte(0x11)
	));
	assert_eq!(client.unsubscribe_count(), 1);
}

#[tokio::test]
async fn test_missing_call_fails_before_signing() {
	let client = MockChainClient::new().with_account(&dev::alice(), 0).without_submit_data();
	let submitter = Submitter::new(client.clone());

	let result = submitter.submit_data(&dev::alice(), AppId(0), vec![1]).await;
	assert!(matches!(
		result,
		Err(Error::CallNotFound { ref pallet, ref call })
			if pallet == "DataAvailability" && call == "submit_data"
	));

	let ops = client.operations();
	assert!(!ops.iter().any(|op| matches!(op, MockOperation::Sign { .. })));
	assert!(!ops.iter().any(|op| matches!(op, MockOperation::Submit { .. })));
	assert_eq!(client.unsubscribe_count(), 0);
}

#[tokio::test]
async fn test_unknown_account_rejected_by_default() {
	let client = MockChainClient::new();
	let submitter = Submitter::new(client.clone());

	let result = submitter.submit_data(&dev::charlie(), AppId(0), vec![1]).await;
	assert!(matches!(result, Err(Error::AccountNotFound(_))));
	assert!(client.signed_options().is_empty());
}

#[tokio::test]
async fn test_unknown_account_assumes_zero_nonce_when_allowed() -> Result<()> {
	let client = MockChainClient::new();
	let config =
		ClientConfig::default().with_unknown_account(UnknownAccountPolicy::AssumeZeroNonce);
	let submitter = Submitter::with_config(client.clone(), config)?;

	submitter.submit_data(&dev::charlie(), AppId(0), vec![1]).await?;
	assert_eq!(client.signed_options()[0].nonce, 0);
	Ok(())
}

#[tokio::test]
async fn test_storage_failure_aborts() {
	let config = MockChainConfig { simulate_storage_failure: true, ..Default::default() };
	let client = MockChainClient::with_config(config).with_account(&dev::alice(), 0);
	let submitter = Submitter::new(client.clone());

	let result = submitter.submit_data(&dev::alice(), AppId(0), vec![1]).await;
	assert!(matches!(
		result,
		Err(Error::Rpc(e)) if e.to_string().contains("Simulated storage failure")
	));
	assert!(client.signed_options().is_empty());
	assert_eq!(client.unsubscribe_count(), 0);
}

fn assert_nothing_sent(client: &MockChainClient) {
	let ops = client.operations();
	assert!(!ops.iter().any(|op| matches!(op, MockOperation::Sign { .. })));
	assert!(!ops.iter().any(|op| matches!(op, MockOperation::Submit { .. })));
	assert_eq!(client.unsubscribe_count(), 0);
}

#[tokio::test]
async fn test_chain_read_failures_abort_before_signing() {
	let cases = vec![
		(
			MockChainConfig { simulate_metadata_failure: true, ..Default::default() },
			"Simulated metadata failure",
			MockOperation::Metadata,
		),
		(
			MockChainConfig { simulate_genesis_failure: true, ..Default::default() },
			"Simulated genesis hash failure",
			MockOperation::BlockHash(0),
		),
		(
			MockChainConfig { simulate_runtime_version_failure: true, ..Default::default() },
			"Simulated runtime version failure",
			MockOperation::RuntimeVersion,
		),
	];
	for (config, message, failed_at) in cases {
		let client = MockChainClient::with_config(config).with_account(&dev::alice(), 0);
		let submitter = Submitter::new(client.clone());

		let result = submitter.submit_data(&dev::alice(), AppId(0), vec![1]).await;
		match result {
			Err(Error::Rpc(e)) => assert!(e.to_string().contains(message), "{message}: {e}"),
			other => panic!("unexpected result for {message}: {other:?}"),
		}
		assert_eq!(client.operations().last(), Some(&failed_at));
		assert_nothing_sent(&client);
		assert_eq!(client.nonce(&dev::alice()), Some(0));
	}
}

#[tokio::test]
async fn test_submit_failure_aborts_without_subscription() {
	let config = MockChainConfig { simulate_submit_failure: true, ..Default::default() };
	let client = MockChainClient::with_config(config).with_account(&dev::alice(), 0);
	let submitter = Submitter::new(client.clone());

	let result = submitter.submit_data(&dev::alice(), AppId(0), vec![1]).await;
	assert!(matches!(
		result,
		Err(Error::Rpc(e)) if e.to_string().contains("Simulated submit failure")
	));
	assert_eq!(client.signed_options().len(), 1);
	assert!(!client.operations().iter().any(|op| matches!(op, MockOperation::Submit { .. })));
	assert_eq!(client.unsubscribe_count(), 0);
	assert_eq!(client.nonce(&dev::alice()), Some(0));

	// The failed attempt must not keep the account locked.
	let retry = tokio::time::timeout(
		Duration::from_secs(1),
		submitter.submit_data(&dev::alice(), AppId(0), vec![2]),
	)
	.await
	.expect("account still locked after failed submit");
	assert!(matches!(retry, Err(Error::Rpc(_))));
	assert_eq!(client.signed_options()[1].nonce, 0);
}

#[tokio::test]
async fn test_unknown_including_block() {
	let config = MockChainConfig { simulate_missing_block: true, ..Default::default() };
	let client = MockChainClient::with_config(config).with_account(&dev::alice(), 0);
	let submitter = Submitter::new(client.clone());

	let result = submitter.submit_data(&dev::alice(), AppId(0), vec![1]).await;
	assert!(matches!(result, Err(Error::UnknownBlock(block)) if block == H256::repeat_byte(0x11)));
	assert_eq!(client.unsubscribe_count(), 1);
}

#[tokio::test]
async fn test_signing_failure_aborts() {
	let config = MockChainConfig { simulate_signing_failure: true, ..Default::default() };
	let client = MockChainClient::with_config(config).with_account(&dev::alice(), 0);
	let submitter = Submitter::new(client.clone());

	let result = submitter.submit_data(&dev::alice(), AppId(0), vec![1]).await;
	assert!(matches!(result, Err(Error::Signing(_))));
	assert!(!client.operations().iter().any(|op| matches!(op, MockOperation::Submit { .. })));
}

#[tokio::test]
async fn test_closed_stream_is_an_error() {
	let client = MockChainClient::new()
		.with_account(&dev::alice(), 0)
		.with_script(vec![ScriptedStatus::Status(TxStatus::Ready)]);
	let submitter = Submitter::new(client.clone());

	let result = submitter.submit_data(&dev::alice(), AppId(0), vec![1]).await;
	assert!(matches!(result, Err(Error::SubscriptionClosed)));
	assert_eq!(client.unsubscribe_count(), 1);
}

#[tokio::test]
async fn test_inclusion_timeout() {
	let client = MockChainClient::new()
		.with_account(&dev::alice(), 0)
		.with_script(vec![ScriptedStatus::Status(TxStatus::Ready), ScriptedStatus::Stall]);
	let config = ClientConfig::default().with_inclusion_timeout(Duration::from_millis(50));
	let submitter = Submitter::with_config(client.clone(), config).unwrap();

	let result = submitter.submit_data(&dev::alice(), AppId(0), vec![1]).await;
	assert!(matches!(result, Err(Error::InclusionTimeout(t)) if t == Duration::from_millis(50)));
	assert_eq!(client.unsubscribe_count(), 1);
}

#[tokio::test]
async fn test_cancelled_submission_releases_subscription() {
	let client = MockChainClient::new()
		.with_account(&dev::alice(), 0)
		.with_script(vec![ScriptedStatus::Stall]);
	let submitter = Submitter::new(client.clone());

	let attempt = tokio::time::timeout(
		Duration::from_millis(50),
		submitter.submit_data(&dev::alice(), AppId(0), vec![1]),
	)
	.await;
	assert!(attempt.is_err());
	assert_eq!(client.unsubscribe_count(), 1);

	// The account is free again once the cancelled attempt is gone.
	let metadata = client.metadata().await.unwrap();
	let call = client.new_call(&metadata, "DataAvailability", "submit_data", vec![2]).unwrap();
	let submission = tokio::time::timeout(
		Duration::from_secs(1),
		submitter.sign_and_send(&metadata, &dev::alice(), AppId(0), call),
	)
	.await
	.expect("no leftover lock")
	.unwrap();
	assert_eq!(client.signed_options()[1].nonce, 1);

	drop(submission);
	assert_eq!(client.unsubscribe_count(), 2);
}

#[tokio::test]
async fn test_concurrent_submissions_are_serialized() -> Result<()> {
	let client = MockChainClient::new().with_account(&dev::alice(), 0);
	let submitter = Submitter::new(client.clone());
	let alice = dev::alice();

	let (first, second) = tokio::join!(
		submitter.submit_data(&alice, AppId(0), vec![1]),
		submitter.submit_data(&alice, AppId(0), vec![2]),
	);
	first?;
	second?;

	let mut nonces: Vec<_> = client.signed_options().iter().map(|o| o.nonce).collect();
	nonces.sort();
	assert_eq!(nonces, vec![0, 1]);
	assert_eq!(client.nonce(&alice), Some(2));
	assert_eq!(client.unsubscribe_count(), 2);
	Ok(())
}

#[tokio::test]
async fn test_different_accounts_do_not_block_each_other() -> Result<()> {
	let client = MockChainClient::new()
		.with_account(&dev::alice(), 0)
		.with_account(&dev::bob(), 0);
	let submitter = Submitter::new(client.clone());

	let (alice, bob) = (dev::alice(), dev::bob());
	let (a, b) = tokio::join!(
		submitter.submit_data(&alice, AppId(0), vec![1]),
		submitter.submit_data(&bob, AppId(0), vec![2]),
	);
	a?;
	b?;
	assert_eq!(client.nonce(&dev::alice()), Some(1));
	assert_eq!(client.nonce(&dev::bob()), Some(1));
	Ok(())
}

#[tokio::test]
async fn test_sign_and_send_waits_for_in_flight_submission() -> Result<()> {
	let client = MockChainClient::new().with_account(&dev::alice(), 0);
	let submitter = Submitter::new(client.clone());
	let metadata = client.metadata().await?;

	let call = client.new_call(&metadata, "DataAvailability", "submit_data", vec![1])?;
	let first = submitter.sign_and_send(&metadata, &dev::alice(), AppId(0), call).await?;

	let call = client.new_call(&metadata, "DataAvailability", "submit_data", vec![2])?;
	let blocked = tokio::time::timeout(
		Duration::from_millis(50),
		submitter.sign_and_send(&metadata, &dev::alice(), AppId(0), call.clone()),
	)
	.await;
	assert!(blocked.is_err());

	drop(first);
	let second = submitter.sign_and_send(&metadata, &dev::alice(), AppId(0), call).await?;
	drop(second);

	let nonces: Vec<_> = client.signed_options().iter().map(|o| o.nonce).collect();
	assert_eq!(nonces, vec![0, 1]);
	assert_eq!(client.unsubscribe_count(), 2);
	Ok(())
}

#[tokio::test]
async fn test_invalid_config_rejected() {
	let config = ClientConfig::default().with_endpoint("");
	assert!(matches!(
		Submitter::with_config(MockChainClient::new(), config),
		Err(Error::InvalidConfig(_))
	));
}

#[tokio::test]
#[ignore] // Run with --ignored flag when local node is available
async fn test_submit_data_live() -> Result<()> {
	let client = RpcChainClient::from_url("ws://127.0.0.1:9944").await?;
	let submitter = Submitter::new(client);

	let id = submitter.submit_data(&dev::alice(), AppId(0), hex::decode("ab1234").unwrap()).await?;
	println!("TxId: {id}");
	assert_ne!(id.block, H256::zero());
	Ok(())
}

#[tokio::test]
#[ignore]
async fn test_metadata_exposes_submit_data_live() -> Result<()> {
	let client = RpcChainClient::from_url("ws://127.0.0.1:9944").await?;
	let metadata = client.metadata().await?;
	client.new_call(&metadata, "DataAvailability", "submit_data", vec![0])?;
	assert_eq!(client.block_hash(0).await?, client.block_hash(0).await?);
	Ok(())
}
