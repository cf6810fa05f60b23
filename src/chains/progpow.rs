use std::marker::PhantomData;

use powdag_core::progpow;
use powdag_core::{CacheManager, CacheOptions, DagConfig, FullDataset, LightDataset};

use crate::params::ProgPowParams;
use crate::types::{to_header_hash, Algorithm, PowCompute, PowError, H256};

/// ProgPow-family verification against the light cache and its L1 cache.
pub struct ProgPowCpu<P: ProgPowParams> {
	caches: CacheManager,
	_params: PhantomData<fn() -> P>,
}

impl<P: ProgPowParams> ProgPowCpu<P> {
	pub fn new(options: CacheOptions) -> Self {
		let cfg = DagConfig {
			l1_cache_bytes: Some(P::PROGPOW.cache_bytes as usize),
			..P::dag_config()
		};
		ProgPowCpu {
			caches: CacheManager::new(cfg, options),
			_params: PhantomData,
		}
	}

	pub fn caches(&self) -> &CacheManager {
		&self.caches
	}

	pub fn full_dataset(&self, height: u64) -> FullDataset {
		super::full_dataset(&self.caches, height)
	}

	/// Same as `compute`, reading items from a materialized dataset. The
	/// dataset must belong to the epoch of `height`.
	pub fn compute_full(
		&self,
		dataset: &FullDataset,
		header_hash: &[u8],
		height: u64,
		nonce: u64,
	) -> Result<(H256, H256), PowError> {
		let header = to_header_hash(header_hash)?;
		let cache = self.caches.get(self.caches.config().epoch(height));
		Ok(progpow::hash(
			&P::PROGPOW,
			P::PADDING,
			&header,
			height,
			nonce,
			dataset.size(),
			dataset,
			l1(cache.l1()),
		))
	}
}

fn l1(l1: Option<&[u8]>) -> &[u8] {
	l1.expect("progpow caches are configured with an L1 cache")
}

impl<P: ProgPowParams> PowCompute for ProgPowCpu<P> {
	fn compute(&self, header_hash: &[u8], height: u64, nonce: u64) -> Result<(H256, H256), PowError> {
		let header = to_header_hash(header_hash)?;
		let cfg = self.caches.config();
		let epoch = cfg.epoch(height);
		let cache = self.caches.get(epoch);

		Ok(progpow::hash(
			&P::PROGPOW,
			P::PADDING,
			&header,
			height,
			nonce,
			cfg.dataset_size(epoch),
			&LightDataset::new(cache.cache(), cfg.dataset_parents),
			l1(cache.l1()),
		))
	}

	fn algorithm(&self) -> Algorithm {
		P::ALGORITHM
	}
}
