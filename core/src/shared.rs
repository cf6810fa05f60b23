use byteorder::{ByteOrder, LittleEndian};
use primal::is_prime;

use crate::sizes::{ETHASH_CACHE_SIZES, ETHASH_DATASET_SIZES};

pub const NODE_BYTES: usize = 64;
pub const NODE_WORDS: usize = NODE_BYTES / 4;

pub const MIX_BYTES: usize = 128;
pub const MIX_WORDS: usize = MIX_BYTES / 4;
pub const MIX_NODES: usize = MIX_BYTES / NODE_BYTES;
pub const ACCESSES: usize = 64;

pub const CACHE_ROUNDS: usize = 3;
pub const L1_CACHE_BYTES: usize = 16 * 1024;

pub const FNV_PRIME: u32 = 0x0100_0193;
pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// Precomputed `epoch -> size` values, indexed by epoch.
pub type SizeTable = &'static [u64];

#[inline]
pub fn fnv1(u: u32, v: u32) -> u32 {
	u.wrapping_mul(FNV_PRIME) ^ v
}

#[inline]
pub fn fnv1a(u: u32, v: u32) -> u32 {
	(u ^ v).wrapping_mul(FNV_PRIME)
}

#[inline]
pub fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
	LittleEndian::read_u32(&buf[offset..offset + 4])
}

#[inline]
pub fn write_u32_le(buf: &mut [u8], offset: usize, value: u32) {
	LittleEndian::write_u32(&mut buf[offset..offset + 4], value)
}

pub fn epoch(height: u64, epoch_length: u64) -> u64 {
	height / epoch_length
}

/// A single 64-byte dataset or cache row.
///
/// The bytes are the source of truth; words are always read and written
/// little-endian so the layout does not depend on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
	bytes: [u8; NODE_BYTES],
}

impl Default for Node {
	fn default() -> Self {
		Node {
			bytes: [0u8; NODE_BYTES],
		}
	}
}

impl Node {
	pub fn from_slice(bytes: &[u8]) -> Self {
		let mut node = Node::default();
		node.bytes.copy_from_slice(bytes);
		node
	}

	pub fn from_words(words: &[u32; NODE_WORDS]) -> Self {
		let mut node = Node::default();
		LittleEndian::write_u32_into(words, &mut node.bytes);
		node
	}

	#[inline]
	pub fn as_bytes(&self) -> &[u8; NODE_BYTES] {
		&self.bytes
	}

	#[inline]
	pub fn as_bytes_mut(&mut self) -> &mut [u8; NODE_BYTES] {
		&mut self.bytes
	}

	#[inline]
	pub fn word(&self, index: usize) -> u32 {
		read_u32_le(&self.bytes, index * 4)
	}

	#[inline]
	pub fn set_word(&mut self, index: usize, value: u32) {
		write_u32_le(&mut self.bytes, index * 4, value)
	}

	pub fn to_words(&self) -> [u32; NODE_WORDS] {
		let mut words = [0u32; NODE_WORDS];
		LittleEndian::read_u32_into(&self.bytes, &mut words);
		words
	}
}

/// Chain constants that drive cache and dataset derivation.
#[derive(Debug, Clone)]
pub struct DagConfig {
	pub name: String,
	/// Revision of the on-disk format, part of every file name.
	pub revision: u32,

	pub dataset_init_bytes: u64,
	pub dataset_growth_bytes: u64,
	pub cache_init_bytes: u64,
	pub cache_growth_bytes: u64,

	pub cache_sizes: Option<SizeTable>,
	pub dataset_sizes: Option<SizeTable>,

	pub mix_bytes: u64,
	pub dataset_parents: u32,
	pub epoch_length: u64,
	/// Epoch length used for seed derivation; ETC seeds on a shorter period
	/// than it epochs on.
	pub seed_epoch_length: u64,

	pub cache_rounds: usize,
	/// Size of the materialized L1 cache, `None` for chains without one.
	pub l1_cache_bytes: Option<usize>,
}

impl DagConfig {
	/// Ethereum's constants, used as the base for every shipped chain.
	pub fn ethash(name: &str) -> Self {
		DagConfig {
			name: name.to_owned(),
			revision: 23,
			dataset_init_bytes: 1 << 30,
			dataset_growth_bytes: 1 << 23,
			cache_init_bytes: 1 << 24,
			cache_growth_bytes: 1 << 17,
			cache_sizes: Some(&ETHASH_CACHE_SIZES),
			dataset_sizes: Some(&ETHASH_DATASET_SIZES),
			mix_bytes: MIX_BYTES as u64,
			dataset_parents: 256,
			epoch_length: 30_000,
			seed_epoch_length: 30_000,
			cache_rounds: CACHE_ROUNDS,
			l1_cache_bytes: None,
		}
	}

	pub fn epoch(&self, height: u64) -> u64 {
		epoch(height, self.epoch_length)
	}

	pub fn cache_size(&self, epoch: u64) -> u64 {
		match self.cache_sizes {
			Some(table) if epoch < table.len() as u64 => table[epoch as usize],
			_ => calc_cache_size(self.cache_init_bytes, self.cache_growth_bytes, epoch),
		}
	}

	pub fn dataset_size(&self, epoch: u64) -> u64 {
		match self.dataset_sizes {
			Some(table) if epoch < table.len() as u64 => table[epoch as usize],
			_ => calc_dataset_size(
				self.dataset_init_bytes,
				self.dataset_growth_bytes,
				self.mix_bytes,
				epoch,
			),
		}
	}
}

pub fn cache_size(cfg: &DagConfig, epoch: u64) -> u64 {
	cfg.cache_size(epoch)
}

pub fn dataset_size(cfg: &DagConfig, epoch: u64) -> u64 {
	cfg.dataset_size(epoch)
}

pub fn calc_cache_size(init_bytes: u64, growth_bytes: u64, epoch: u64) -> u64 {
	prime_size(init_bytes + growth_bytes * epoch, NODE_BYTES as u64)
}

pub fn calc_dataset_size(init_bytes: u64, growth_bytes: u64, mix_bytes: u64, epoch: u64) -> u64 {
	prime_size(init_bytes + growth_bytes * epoch, mix_bytes)
}

// Largest `size < upper` with `size / unit` prime, stepping by two units.
fn prime_size(upper: u64, unit: u64) -> u64 {
	let mut size = upper
		.checked_sub(unit)
		.unwrap_or_else(|| panic!("size {} is smaller than its unit {}", upper, unit));
	while !is_prime(size / unit) {
		size = size.checked_sub(2 * unit).unwrap_or_else(|| {
			panic!("no prime row count below {} bytes with unit {}", upper, unit)
		});
	}
	size
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::sizes::FIRO_DATASET_SIZES;

	#[test]
	fn test_fnv1a() {
		assert_eq!(fnv1a(0x811C9DC5, 0xDDD0A47B), 0xD37EE61A);
		assert_eq!(fnv1a(0xD37EE61A, 0xEE304846), 0xDEDC7AD4);
		assert_eq!(fnv1a(0xDEDC7AD4, 0x00000000), 0xA9155BBC);
	}

	#[test]
	fn test_epoch() {
		let cfg = DagConfig {
			epoch_length: 7500,
			..DagConfig::ethash("RVN")
		};
		for &(height, expected) in &[
			(0u64, 0u64),
			(1, 0),
			(7499, 0),
			(7500, 1),
			(7501, 1),
			(7502, 1),
			(1_245_000, 166),
		] {
			assert_eq!(cfg.epoch(height), expected, "height {}", height);
		}
	}

	#[test]
	fn test_calc_cache_size() {
		let expected = [
			16776896u64, 16907456, 17039296, 17170112, 17301056, 17432512, 17563072, 17693888,
			17824192, 17955904,
		];
		for (epoch, size) in expected.iter().enumerate() {
			assert_eq!(calc_cache_size(1 << 24, 1 << 17, epoch as u64), *size);
		}
	}

	#[test]
	fn test_calc_dataset_size() {
		let expected = [
			1073739904u64, 1082130304, 1090514816, 1098906752, 1107293056, 1115684224,
			1124070016, 1132461952, 1140849536, 1149232768,
		];
		for (epoch, size) in expected.iter().enumerate() {
			assert_eq!(calc_dataset_size(1 << 30, 1 << 23, 128, epoch as u64), *size);
		}
	}

	#[test]
	fn test_size_tables_match_formula() {
		for (epoch, size) in ETHASH_CACHE_SIZES.iter().enumerate() {
			assert_eq!(calc_cache_size(1 << 24, 1 << 17, epoch as u64), *size);
		}
		for (epoch, size) in ETHASH_DATASET_SIZES.iter().enumerate() {
			assert_eq!(calc_dataset_size(1 << 30, 1 << 23, 128, epoch as u64), *size);
		}
		for (epoch, size) in FIRO_DATASET_SIZES.iter().enumerate() {
			let init = (1 << 30) + (1 << 29);
			assert_eq!(calc_dataset_size(init, 1 << 23, 128, epoch as u64), *size);
		}
	}

	#[test]
	fn test_sizes_are_monotonic_and_prime() {
		let cfg = DagConfig::ethash("ETH");
		let mut last = (0, 0);
		for epoch in (0..4096).step_by(7) {
			let cache = cfg.cache_size(epoch);
			let dataset = cfg.dataset_size(epoch);
			assert!(cache > last.0 && dataset > last.1);
			assert!(is_prime(cache / NODE_BYTES as u64));
			assert!(is_prime(dataset / cfg.mix_bytes));
			last = (cache, dataset);
		}
	}

	#[test]
	fn test_sizes_past_table() {
		let cfg = DagConfig::ethash("ETH");
		let untabulated = DagConfig {
			cache_sizes: None,
			dataset_sizes: None,
			..cfg.clone()
		};
		for epoch in &[0u64, 1, 2047, 2048, 2049, 5000] {
			assert_eq!(cfg.cache_size(*epoch), untabulated.cache_size(*epoch));
			assert_eq!(cfg.dataset_size(*epoch), untabulated.dataset_size(*epoch));
		}
	}

	#[test]
	fn test_node_words() {
		let mut node = Node::default();
		node.set_word(1, 0xdead_beef);
		assert_eq!(&node.as_bytes()[4..8], &[0xef, 0xbe, 0xad, 0xde]);
		assert_eq!(node.word(1), 0xdead_beef);
		assert_eq!(Node::from_words(&node.to_words()), node);
	}
}
