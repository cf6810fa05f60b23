//! Epoch-indexed dataset caches and the memory-hard mixing functions shared
//! by the Ethash family of proof-of-work algorithms.

extern crate byteorder;
extern crate either;
extern crate memmap;
extern crate once_cell;
extern crate parking_lot;
extern crate primal;
#[macro_use]
extern crate crunchy;
#[macro_use]
extern crate log;

#[cfg(test)]
extern crate rustc_hex;
#[cfg(test)]
extern crate serde_json;
#[cfg(test)]
extern crate tempdir;

pub mod cache;
pub mod compute;
mod keccak;
pub mod progpow;
pub mod seed_compute;
pub mod shared;
pub mod sizes;
pub mod store;

pub use cache::{Cache, CacheManager, CacheOptions};
pub use compute::{
	calculate_dataset_item, generate_cache, generate_l1_cache, hashimoto, hashimoto_full,
	hashimoto_light, DatasetSource, FullDataset, LightDataset,
};
pub use crate::keccak::H256;
pub use seed_compute::{seed_hash, SeedHashCompute};
pub use shared::{cache_size, dataset_size, epoch, DagConfig, Node, SizeTable};
pub use store::StoreError;
