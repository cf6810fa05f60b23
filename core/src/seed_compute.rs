use crate::keccak::{keccak_256, H256};
use crate::shared::DagConfig;

/// Number of Keccak-256 applications that produce the seed of `epoch`.
fn seed_iterations(cfg: &DagConfig, epoch: u64) -> u64 {
	let height = epoch * cfg.epoch_length + 1;
	if height < cfg.seed_epoch_length {
		0
	} else {
		height / cfg.seed_epoch_length
	}
}

/// Seed of the given epoch. Purely sequential; recomputed on demand.
pub fn seed_hash(cfg: &DagConfig, epoch: u64) -> H256 {
	SeedHashCompute::default().hash_iterations(seed_iterations(cfg, epoch))
}

/// Resumable seed computation: requests for increasing epochs only pay for
/// the hashes between the previous request and the new one.
#[derive(Default)]
pub struct SeedHashCompute {
	iterations: u64,
	seed: H256,
}

impl SeedHashCompute {
	pub fn hash_epoch(&mut self, cfg: &DagConfig, epoch: u64) -> H256 {
		self.hash_iterations(seed_iterations(cfg, epoch))
	}

	fn hash_iterations(&mut self, iterations: u64) -> H256 {
		if iterations < self.iterations {
			*self = SeedHashCompute::default();
		}
		for _ in self.iterations..iterations {
			keccak_256::inplace(&mut self.seed);
		}
		self.iterations = iterations;
		self.seed
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use rustc_hex::FromHex;

	fn rvn() -> DagConfig {
		DagConfig {
			epoch_length: 7500,
			seed_epoch_length: 7500,
			..DagConfig::ethash("RVN")
		}
	}

	fn hex(s: &str) -> Vec<u8> {
		s.from_hex().unwrap()
	}

	#[test]
	fn test_seed_hash() {
		let cfg = rvn();
		let vectors = [
			(0u64, "0000000000000000000000000000000000000000000000000000000000000000"),
			(1, "290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563"),
			(171, "a9b0e0c9aca72c07ba06b5bbdae8b8f69e61878301508473379bb4f71807d707"),
			(2048, "20a7678ca7b50829183baac2e1e3c43fa3c4bcbc171b11cf5a9f30bebd172920"),
			(29998, "1222b1faed7f93098f8ae498621fb3479805a664b70186063861c46596c66164"),
			(29999, "ee1d0f61b054dff0f3025ebba821d405c8dc19a983e582e9fa5436fc3e7a07d8"),
		];
		for &(epoch, expected) in vectors.iter() {
			assert_eq!(&seed_hash(&cfg, epoch)[..], &hex(expected)[..], "epoch {}", epoch);
		}
	}

	#[test]
	fn test_seed_compute_resumes_and_restarts() {
		let cfg = rvn();
		let mut compute = SeedHashCompute::default();
		assert_eq!(compute.hash_epoch(&cfg, 171), seed_hash(&cfg, 171));
		assert_eq!(compute.hash_epoch(&cfg, 2048), seed_hash(&cfg, 2048));
		assert_eq!(compute.hash_epoch(&cfg, 1), seed_hash(&cfg, 1));
		assert_eq!(compute.hash_epoch(&cfg, 0), [0u8; 32]);
	}

	#[test]
	fn test_seed_hash_with_shorter_seed_epoch() {
		// ETC epochs span 60000 blocks but seeds advance every 30000.
		let etc = DagConfig {
			epoch_length: 60_000,
			..DagConfig::ethash("ETC")
		};
		let eth = DagConfig::ethash("ETH");
		assert_eq!(seed_hash(&etc, 0), [0u8; 32]);
		assert_eq!(seed_hash(&etc, 1), seed_hash(&eth, 2));
		assert_eq!(seed_hash(&etc, 200), seed_hash(&eth, 400));
	}
}
