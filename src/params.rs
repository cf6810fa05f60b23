use std::fmt;
use std::str::FromStr;

use powdag_core::progpow::{self, Padding, ProgPowConfig};
use powdag_core::shared::L1_CACHE_BYTES;
use powdag_core::sizes::{ETHASH_DATASET_SIZES, FIRO_DATASET_SIZES};
use powdag_core::{DagConfig, SizeTable};

use crate::types::{Algorithm, PowError};

/// Dataset constants of a chain. Everything not overridden is Ethereum's.
pub trait ChainParams {
	const NAME: &'static str;
	const EPOCH_LENGTH: u64;
	const SEED_EPOCH_LENGTH: u64 = Self::EPOCH_LENGTH;
	const DATASET_PARENTS: u32;
	const DATASET_INIT_BYTES: u64 = 1 << 30;
	const L1_CACHE: bool = false;

	/// Precomputed dataset sizes matching `DATASET_INIT_BYTES`, if any.
	fn dataset_sizes() -> Option<SizeTable> {
		Some(&ETHASH_DATASET_SIZES)
	}

	fn dag_config() -> DagConfig {
		let base = DagConfig::ethash(Self::NAME);
		DagConfig {
			dataset_init_bytes: Self::DATASET_INIT_BYTES,
			dataset_sizes: Self::dataset_sizes(),
			dataset_parents: Self::DATASET_PARENTS,
			epoch_length: Self::EPOCH_LENGTH,
			seed_epoch_length: Self::SEED_EPOCH_LENGTH,
			l1_cache_bytes: if Self::L1_CACHE { Some(L1_CACHE_BYTES) } else { None },
			..base
		}
	}
}

/// Chains hashed with one of the ProgPow variants.
pub trait ProgPowParams: ChainParams {
	const PROGPOW: ProgPowConfig;
	const PADDING: Padding;
	const ALGORITHM: Algorithm;
}

pub struct Ethereum;
pub struct EthereumClassic;
pub struct Ravencoin;
pub struct Firo;
pub struct ProgPow092;
pub struct ProgPow094;

impl ChainParams for Ethereum {
	const NAME: &'static str = "ETH";
	const EPOCH_LENGTH: u64 = 30_000;
	const DATASET_PARENTS: u32 = 256;
}

impl ChainParams for EthereumClassic {
	const NAME: &'static str = "ETC";
	const EPOCH_LENGTH: u64 = 60_000;
	const SEED_EPOCH_LENGTH: u64 = 30_000;
	const DATASET_PARENTS: u32 = 256;
}

impl ChainParams for Ravencoin {
	const NAME: &'static str = "RVN";
	const EPOCH_LENGTH: u64 = 7_500;
	const DATASET_PARENTS: u32 = 512;
	const L1_CACHE: bool = true;
}

impl ProgPowParams for Ravencoin {
	const PROGPOW: ProgPowConfig = progpow::KAWPOW;
	const PADDING: Padding = Padding::Ravencoin;
	const ALGORITHM: Algorithm = Algorithm::Kawpow;
}

impl ChainParams for Firo {
	const NAME: &'static str = "FIRO";
	const EPOCH_LENGTH: u64 = 1_300;
	const DATASET_PARENTS: u32 = 512;
	const DATASET_INIT_BYTES: u64 = (1 << 30) + (1 << 29);
	const L1_CACHE: bool = true;

	fn dataset_sizes() -> Option<SizeTable> {
		Some(&FIRO_DATASET_SIZES)
	}
}

impl ProgPowParams for Firo {
	const PROGPOW: ProgPowConfig = progpow::FIROPOW;
	const PADDING: Padding = Padding::Firo;
	const ALGORITHM: Algorithm = Algorithm::Firopow;
}

macro_rules! progpow_chain {
	($chain:ident, $name:expr, $parents:expr, $config:expr) => {
		impl ChainParams for $chain {
			const NAME: &'static str = $name;
			const EPOCH_LENGTH: u64 = 30_000;
			const DATASET_PARENTS: u32 = $parents;
			const L1_CACHE: bool = true;
		}

		impl ProgPowParams for $chain {
			const PROGPOW: ProgPowConfig = $config;
			const PADDING: Padding = Padding::Zero;
			const ALGORITHM: Algorithm = Algorithm::ProgPow;
		}
	};
}

progpow_chain!(ProgPow092, "PROGPOW092", 256, progpow::PROGPOW_092);
progpow_chain!(ProgPow094, "PROGPOW094", 512, progpow::PROGPOW_094);

/// Every chain with a built-in parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
	Ethereum,
	EthereumClassic,
	Ravencoin,
	Firo,
	ProgPow092,
	ProgPow094,
}

impl Chain {
	pub const ALL: [Chain; 6] = [
		Chain::Ethereum,
		Chain::EthereumClassic,
		Chain::Ravencoin,
		Chain::Firo,
		Chain::ProgPow092,
		Chain::ProgPow094,
	];

	/// Look a chain up by its ticker, case-insensitively.
	pub fn from_name(name: &str) -> Result<Chain, PowError> {
		Chain::ALL
			.iter()
			.find(|chain| chain.name().eq_ignore_ascii_case(name))
			.copied()
			.ok_or_else(|| PowError::UnknownChain(name.to_owned()))
	}

	pub fn name(&self) -> &'static str {
		match self {
			Chain::Ethereum => Ethereum::NAME,
			Chain::EthereumClassic => EthereumClassic::NAME,
			Chain::Ravencoin => Ravencoin::NAME,
			Chain::Firo => Firo::NAME,
			Chain::ProgPow092 => ProgPow092::NAME,
			Chain::ProgPow094 => ProgPow094::NAME,
		}
	}

	pub fn algorithm(&self) -> Algorithm {
		match self {
			Chain::Ethereum | Chain::EthereumClassic => Algorithm::Ethash,
			Chain::Ravencoin => Ravencoin::ALGORITHM,
			Chain::Firo => Firo::ALGORITHM,
			Chain::ProgPow092 | Chain::ProgPow094 => Algorithm::ProgPow,
		}
	}

	pub fn dag_config(&self) -> DagConfig {
		match self {
			Chain::Ethereum => Ethereum::dag_config(),
			Chain::EthereumClassic => EthereumClassic::dag_config(),
			Chain::Ravencoin => Ravencoin::dag_config(),
			Chain::Firo => Firo::dag_config(),
			Chain::ProgPow092 => ProgPow092::dag_config(),
			Chain::ProgPow094 => ProgPow094::dag_config(),
		}
	}
}

impl FromStr for Chain {
	type Err = PowError;

	fn from_str(name: &str) -> Result<Chain, PowError> {
		Chain::from_name(name)
	}
}

impl fmt::Display for Chain {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}
