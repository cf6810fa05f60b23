use num_bigint::BigUint;
use num_traits::One;
use thiserror::Error;

pub use powdag_core::H256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
	Ethash,
	Kawpow,
	Firopow,
	ProgPow,
}

#[derive(Debug, Error)]
pub enum PowError {
	#[error("header hash must be 32 bytes, got {0}")]
	InvalidHeaderLength(usize),
	#[error("unknown chain {0}")]
	UnknownChain(String),
}

/// A proof-of-work function keyed by block height.
pub trait PowCompute: Send + Sync {
	/// Returns `(mix_hash, digest)` for the given header hash and nonce.
	fn compute(&self, header_hash: &[u8], height: u64, nonce: u64)
		-> Result<(H256, H256), PowError>;

	fn algorithm(&self) -> Algorithm;

	/// Try `attempts` nonces starting at `start_nonce` and return the first
	/// one whose digest meets `target`.
	fn search(
		&self,
		header_hash: &[u8],
		height: u64,
		start_nonce: u64,
		attempts: u64,
		target: &BigUint,
	) -> Result<Option<(u64, H256, H256)>, PowError> {
		for i in 0..attempts {
			let nonce = start_nonce.wrapping_add(i);
			let (mix, digest) = self.compute(header_hash, height, nonce)?;
			if meets_target(&digest, target) {
				return Ok(Some((nonce, mix, digest)));
			}
		}
		Ok(None)
	}
}

/// `(2^256 - 1) / difficulty`; a zero difficulty is treated as one.
pub fn target_from_difficulty(difficulty: u64) -> BigUint {
	let max = (BigUint::one() << 256usize) - BigUint::one();
	max / BigUint::from(difficulty.max(1))
}

/// Whether `digest`, read as a big-endian number, is at most `target`.
pub fn meets_target(digest: &H256, target: &BigUint) -> bool {
	BigUint::from_bytes_be(digest) <= *target
}

pub(crate) fn to_header_hash(header_hash: &[u8]) -> Result<H256, PowError> {
	if header_hash.len() != 32 {
		return Err(PowError::InvalidHeaderLength(header_hash.len()));
	}
	let mut hash = [0u8; 32];
	hash.copy_from_slice(header_hash);
	Ok(hash)
}
