use std::marker::PhantomData;

use powdag_core::{hashimoto_full, hashimoto_light, CacheManager, CacheOptions, FullDataset};

use crate::params::ChainParams;
use crate::types::{to_header_hash, Algorithm, PowCompute, PowError, H256};

/// Ethash verification against the light cache.
pub struct EthashCpu<P: ChainParams> {
	caches: CacheManager,
	_params: PhantomData<fn() -> P>,
}

impl<P: ChainParams> EthashCpu<P> {
	pub fn new(options: CacheOptions) -> Self {
		EthashCpu {
			caches: CacheManager::new(P::dag_config(), options),
			_params: PhantomData,
		}
	}

	pub fn caches(&self) -> &CacheManager {
		&self.caches
	}

	pub fn full_dataset(&self, height: u64) -> FullDataset {
		super::full_dataset(&self.caches, height)
	}

	/// Same as `compute`, reading items from a materialized dataset.
	pub fn compute_full(
		&self,
		dataset: &FullDataset,
		header_hash: &[u8],
		nonce: u64,
	) -> Result<(H256, H256), PowError> {
		let header = to_header_hash(header_hash)?;
		Ok(hashimoto_full(dataset, &header, nonce))
	}
}

impl<P: ChainParams> PowCompute for EthashCpu<P> {
	fn compute(&self, header_hash: &[u8], height: u64, nonce: u64) -> Result<(H256, H256), PowError> {
		let header = to_header_hash(header_hash)?;
		let cfg = self.caches.config();
		let epoch = cfg.epoch(height);
		let cache = self.caches.get(epoch);

		Ok(hashimoto_light(
			cache.cache(),
			cfg.dataset_parents,
			&header,
			nonce,
			cfg.dataset_size(epoch),
		))
	}

	fn algorithm(&self) -> Algorithm {
		Algorithm::Ethash
	}
}
