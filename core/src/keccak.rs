extern crate keccak_hash as hash;

pub type H256 = [u8; 32];

pub mod keccak_512 {
	use super::hash;

	pub fn write(input: &[u8], output: &mut [u8]) {
		hash::keccak_512(input, &mut output[..64]);
	}

	pub fn inplace(input: &mut [u8]) {
		let mut buf = [0u8; 64];
		hash::keccak_512(input, &mut buf);
		input[..64].copy_from_slice(&buf);
	}
}

pub mod keccak_256 {
	use super::hash;

	pub fn write(input: &[u8], output: &mut [u8]) {
		hash::keccak_256(input, &mut output[..32]);
	}

	pub fn inplace(input: &mut [u8]) {
		let mut buf = [0u8; 32];
		hash::keccak_256(input, &mut buf);
		input[..32].copy_from_slice(&buf);
	}
}

/// Keccak-f[800] with the full 22 rounds.
pub fn keccak_f800(state: &mut [u32; 25]) {
	::keccak::f800(state);
}

#[cfg(test)]
mod test {
	use super::*;
	use rustc_hex::FromHex;

	#[test]
	fn test_keccak_256_of_zero_seed() {
		let mut seed = [0u8; 32];
		keccak_256::inplace(&mut seed);
		let expected: Vec<u8> = "290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563"
			.from_hex()
			.unwrap();
		assert_eq!(&seed[..], &expected[..]);
	}

	#[test]
	fn test_keccak_512_inplace_matches_write() {
		let input = [7u8; 64];
		let mut written = [0u8; 64];
		keccak_512::write(&input, &mut written);
		let mut inplace = input;
		keccak_512::inplace(&mut inplace);
		assert_eq!(&written[..], &inplace[..]);
	}
}
