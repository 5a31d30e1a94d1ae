// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

//! Subxt configuration and the `CheckAppId` transaction extension.
//!
//! The data availability runtime tags every signed extrinsic with an application
//! identifier through the `CheckAppId` extension. [`AvailConfig`] is `SubstrateConfig`
//! with that extension appended to the `AnyOf` tuple, so extrinsics built with it
//! line up with whatever extensions the chain metadata announces.

use crate::types::AppId;
use codec::Compact;
use scale_info::PortableRegistry;
use subxt::config::{substrate::SubstrateConfig, Config};
use subxt_core::{
	client::ClientState,
	config::{
		transaction_extensions::{
			AnyOf, ChargeAssetTxPayment, ChargeTransactionPayment, CheckGenesis, CheckMetadataHash,
			CheckMortality, CheckNonce, CheckSpecVersion, CheckTxVersion, Params as TxParams,
			TransactionExtension, VerifySignature,
		},
		DefaultExtrinsicParamsBuilder, ExtrinsicParams, ExtrinsicParamsEncoder,
	},
	error::ExtrinsicParamsError,
	utils::Static,
};

/// Params for [`CheckAppId`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckAppIdParams(pub AppId);

impl<T: Config> TxParams<T> for CheckAppIdParams {}

/// Subxt-side implementation of the `CheckAppId` extension.
///
/// Encodes the application id as `Compact<u32>` in the extension value and adds
/// nothing to the implicit (signed-only) data.
#[derive(Debug, Clone, Copy)]
pub struct CheckAppId(pub AppId);

impl<T: Config> ExtrinsicParams<T> for CheckAppId {
	type Params = CheckAppIdParams;

	fn new(_client: &ClientState<T>, params: Self::Params) -> Result<Self, ExtrinsicParamsError> {
		Ok(CheckAppId(params.0))
	}
}

impl ExtrinsicParamsEncoder for CheckAppId {
	fn encode_value_to(&self, v: &mut Vec<u8>) {
		codec::Encode::encode_to(&Compact(self.0 .0), v);
	}
}

impl<T: Config> TransactionExtension<T> for CheckAppId {
	type Decoded = Static<Compact<u32>>;

	fn matches(identifier: &str, _type_id: u32, _types: &PortableRegistry) -> bool {
		identifier == "CheckAppId"
	}
}

/// Extrinsic params: the standard extensions plus `CheckAppId`.
pub type AvailExtrinsicParams<T> = AnyOf<
	T,
	(
		VerifySignature<T>,
		CheckSpecVersion,
		CheckTxVersion,
		CheckNonce,
		CheckGenesis<T>,
		CheckMortality<T>,
		ChargeAssetTxPayment<T>,
		ChargeTransactionPayment,
		CheckMetadataHash,
		CheckAppId,
	),
>;

/// Params accepted by [`AvailExtrinsicParams`] for [`AvailConfig`].
pub type AvailExtrinsicParamsOf =
	<AvailExtrinsicParams<AvailConfig> as ExtrinsicParams<AvailConfig>>::Params;

/// Pre-configured `Config` type for the data availability chain.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum AvailConfig {}

impl Config for AvailConfig {
	type AccountId = <SubstrateConfig as Config>::AccountId;
	type Address = <SubstrateConfig as Config>::Address;
	type Signature = <SubstrateConfig as Config>::Signature;
	type Hasher = <SubstrateConfig as Config>::Hasher;
	type Header = <SubstrateConfig as Config>::Header;
	type ExtrinsicParams = AvailExtrinsicParams<Self>;
	type AssetId = <SubstrateConfig as Config>::AssetId;
}

/// Builder for [`AvailConfig`] extrinsic params.
///
/// Wraps the standard builder and appends the `CheckAppId` params.
pub struct AvailExtrinsicParamsBuilder {
	inner: DefaultExtrinsicParamsBuilder<AvailConfig>,
	app_id: AppId,
}

impl Default for AvailExtrinsicParamsBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl AvailExtrinsicParamsBuilder {
	/// Create a builder with subxt's defaults and application id 0.
	pub fn new() -> Self {
		Self { inner: DefaultExtrinsicParamsBuilder::new(), app_id: AppId::default() }
	}

	/// Make the transaction immortal, anchored at genesis.
	pub fn immortal(mut self) -> Self {
		self.inner = self.inner.immortal();
		self
	}

	/// Set the account nonce.
	pub fn nonce(mut self, nonce: u64) -> Self {
		self.inner = self.inner.nonce(nonce);
		self
	}

	/// Set the tip paid to the block author.
	pub fn tip(mut self, tip: u128) -> Self {
		self.inner = self.inner.tip(tip);
		self
	}

	/// Set the application id.
	pub fn app_id(mut self, app_id: AppId) -> Self {
		self.app_id = app_id;
		self
	}

	/// Build params for [`AvailExtrinsicParams`].
	pub fn build(self) -> AvailExtrinsicParamsOf {
		let (a, b, c, d, e, f, g, h, i) = self.inner.build();
		(a, b, c, d, e, f, g, h, i, CheckAppIdParams(self.app_id))
	}
}
