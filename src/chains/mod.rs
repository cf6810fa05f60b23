//! CPU front ends binding a chain's parameters to the shared cache manager.

pub mod ethash;
pub mod progpow;

pub use self::ethash::EthashCpu;
pub use self::progpow::ProgPowCpu;

use powdag_core::{CacheManager, FullDataset};

/// Materialize the whole dataset of the epoch containing `height`.
fn full_dataset(caches: &CacheManager, height: u64) -> FullDataset {
	let cfg = caches.config();
	let epoch = cfg.epoch(height);
	let cache = caches.get(epoch);
	debug!("generating {} dataset for epoch {}", cfg.name, epoch);
	FullDataset::generate_parallel(cache.cache(), cfg.dataset_size(epoch), cfg.dataset_parents)
}
