//! Light-client proof-of-work verification for Ethash-family chains:
//! Ethash and Etchash, Kawpow, Firopow and the ProgPow 0.9.x revisions.

extern crate dirs;
#[macro_use]
extern crate log;
extern crate num_bigint;
extern crate num_traits;
extern crate powdag_core;
extern crate thiserror;

#[cfg(test)]
extern crate rustc_hex;
#[cfg(test)]
extern crate tempdir;

pub mod chains;
pub mod params;
pub mod types;

use std::path::PathBuf;

pub use chains::{EthashCpu, ProgPowCpu};
pub use params::{Chain, ChainParams, ProgPowParams};
pub use powdag_core::{CacheManager, CacheOptions, DagConfig};
pub use types::{meets_target, target_from_difficulty, Algorithm, PowCompute, PowError, H256};

#[cfg(windows)]
const STORAGE_DIR: &str = "AppData/PowCache";
#[cfg(not(windows))]
const STORAGE_DIR: &str = ".powcache";

/// Where caches are persisted unless told otherwise: a directory under the
/// user's home, or a relative one when no home directory is known.
pub fn default_storage_dir() -> PathBuf {
	dirs::home_dir().unwrap_or_default().join(STORAGE_DIR)
}

/// Build a light verifier for the chain called `name`.
pub fn new_light(name: &str, options: CacheOptions) -> Result<Box<dyn PowCompute>, PowError> {
	let chain = Chain::from_name(name)?;
	debug!(
		"creating {} light verifier, storage {:?}",
		chain,
		options.storage_dir
	);

	let compute: Box<dyn PowCompute> = match chain {
		Chain::Ethereum => Box::new(EthashCpu::<params::Ethereum>::new(options)),
		Chain::EthereumClassic => Box::new(EthashCpu::<params::EthereumClassic>::new(options)),
		Chain::Ravencoin => Box::new(ProgPowCpu::<params::Ravencoin>::new(options)),
		Chain::Firo => Box::new(ProgPowCpu::<params::Firo>::new(options)),
		Chain::ProgPow092 => Box::new(ProgPowCpu::<params::ProgPow092>::new(options)),
		Chain::ProgPow094 => Box::new(ProgPowCpu::<params::ProgPow094>::new(options)),
	};
	Ok(compute)
}
