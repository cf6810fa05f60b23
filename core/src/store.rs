//! Persistence of generated buffers as memory-mapped files.
//!
//! A file is two little-endian magic words followed by the raw buffer. Files
//! are written under a temporary name and renamed into place, so a reader
//! never observes a partially filled file under the final name.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};

use byteorder::{ByteOrder, LittleEndian};
use memmap::{Mmap, MmapMut};
use thiserror::Error;

use crate::keccak::H256;
use crate::shared::DagConfig;

pub const DUMP_MAGIC: [u32; 2] = [0xbadd_cafe, 0xfee1_dead];
const HEADER_BYTES: usize = 8;

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("i/o error: {0}")]
	Io(#[from] io::Error),
	#[error("invalid dump magic")]
	InvalidMagic,
	#[error("invalid file length: expected {expected} bytes, found {actual}")]
	InvalidLength { expected: u64, actual: u64 },
	#[error("failed to lock pages in memory: {0}")]
	Lock(#[source] io::Error),
}

/// A read-only mapping of a persisted buffer. Dereferences to the data that
/// follows the magic header; the mapping and file are released on drop.
pub struct DataFile {
	map: Mmap,
	_file: File,
}

impl Deref for DataFile {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		&self.map[HEADER_BYTES..]
	}
}

impl DataFile {
	/// Pin the mapping in RAM. The mapping stays usable if this fails.
	pub fn lock(&self) -> Result<(), StoreError> {
		lock_pages(&self.map).map_err(StoreError::Lock)
	}
}

/// Map an existing file holding exactly `size` bytes of data.
pub fn load(path: &Path, size: u64) -> Result<DataFile, StoreError> {
	let file = File::open(path)?;

	let expected = HEADER_BYTES as u64 + size;
	let actual = file.metadata()?.len();
	if actual != expected {
		return Err(StoreError::InvalidLength { expected, actual });
	}

	// Published files are only ever replaced by rename, never written in place.
	let map = unsafe { Mmap::map(&file)? };
	let mut magic = [0u32; 2];
	LittleEndian::read_u32_into(&map[..HEADER_BYTES], &mut magic);
	if magic != DUMP_MAGIC {
		return Err(StoreError::InvalidMagic);
	}

	Ok(DataFile { map, _file: file })
}

/// Create `path` holding `size` bytes produced by `fill`, then map it back
/// read-only. The temporary file is removed if anything fails.
pub fn create_and_fill<F>(path: &Path, size: u64, fill: F) -> Result<DataFile, StoreError>
where
	F: FnOnce(&mut [u8]),
{
	if let Some(dir) = path.parent() {
		fs::create_dir_all(dir)?;
	}

	let temp = temp_path(path);
	let written = write_temp(&temp, size, fill)
		.and_then(|_| fs::rename(&temp, path).map_err(StoreError::from));
	if let Err(err) = written {
		let _ = fs::remove_file(&temp);
		return Err(err);
	}

	load(path, size)
}

fn write_temp<F>(temp: &Path, size: u64, fill: F) -> Result<(), StoreError>
where
	F: FnOnce(&mut [u8]),
{
	let file = OpenOptions::new()
		.read(true)
		.write(true)
		.create_new(true)
		.open(temp)?;
	file.set_len(HEADER_BYTES as u64 + size)?;

	// The temporary name is unique to this process and call.
	let mut map = unsafe { MmapMut::map_mut(&file)? };
	LittleEndian::write_u32_into(&DUMP_MAGIC, &mut map[..HEADER_BYTES]);
	fill(&mut map[HEADER_BYTES..]);
	map.flush()?;
	Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
	let mut name: OsString = path.as_os_str().to_owned();
	name.push(format!(
		".{}.{}",
		process::id(),
		TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
	));
	PathBuf::from(name)
}

/// Best-effort deletion of a stale file.
pub fn remove(path: &Path) {
	match fs::remove_file(path) {
		Ok(()) => trace!("removed stale file {}", path.display()),
		Err(err) => trace!("could not remove {}: {}", path.display(), err),
	}
}

pub fn cache_path(dir: &Path, cfg: &DagConfig, seed: &H256) -> PathBuf {
	dir.join(file_name("cache", cfg, seed))
}

pub fn l1_path(dir: &Path, cfg: &DagConfig, seed: &H256) -> PathBuf {
	dir.join(file_name("l1", cfg, seed))
}

fn file_name(kind: &str, cfg: &DagConfig, seed: &H256) -> String {
	let seed_hex: String = seed[..8].iter().map(|b| format!("{:02x}", b)).collect();
	let mut name = format!("{}-{}-R{}-{}", kind, cfg.name, cfg.revision, seed_hex);
	if cfg!(target_endian = "big") {
		name.push_str(".be");
	}
	name
}

#[cfg(unix)]
fn lock_pages(buf: &[u8]) -> io::Result<()> {
	let res = unsafe { libc::mlock(buf.as_ptr() as *const libc::c_void, buf.len()) };
	if res == 0 {
		Ok(())
	} else {
		Err(io::Error::last_os_error())
	}
}

#[cfg(not(unix))]
fn lock_pages(_buf: &[u8]) -> io::Result<()> {
	warn!("page locking is not supported on this platform");
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use tempdir::TempDir;

	fn pattern(buf: &mut [u8]) {
		for (i, byte) in buf.iter_mut().enumerate() {
			*byte = (i * 7 % 251) as u8;
		}
	}

	fn expected(size: usize) -> Vec<u8> {
		let mut buf = vec![0u8; size];
		pattern(&mut buf);
		buf
	}

	#[test]
	fn test_create_and_load() {
		let dir = TempDir::new("powdag-store").unwrap();
		let path = dir.path().join("nested").join("data");

		let created = create_and_fill(&path, 4096, pattern).unwrap();
		assert_eq!(&created[..], &expected(4096)[..]);

		let loaded = load(&path, 4096).unwrap();
		assert_eq!(&loaded[..], &expected(4096)[..]);

		// Only the final file remains, no temporaries.
		let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
		assert_eq!(entries, 1);

		let raw = fs::read(&path).unwrap();
		assert_eq!(&raw[..8], &[0xfe, 0xca, 0xdd, 0xba, 0xad, 0xde, 0xe1, 0xfe]);
	}

	#[test]
	fn test_load_rejects_bad_magic() {
		let dir = TempDir::new("powdag-store").unwrap();
		let path = dir.path().join("data");
		drop(create_and_fill(&path, 1024, pattern).unwrap());

		let mut raw = fs::read(&path).unwrap();
		raw[0] ^= 0xff;
		fs::write(&path, &raw).unwrap();

		match load(&path, 1024) {
			Err(StoreError::InvalidMagic) => {}
			other => panic!("unexpected result: {:?}", other.map(|_| ())),
		}
	}

	#[test]
	fn test_load_rejects_wrong_length() {
		let dir = TempDir::new("powdag-store").unwrap();
		let path = dir.path().join("data");
		drop(create_and_fill(&path, 1024, pattern).unwrap());

		OpenOptions::new()
			.write(true)
			.open(&path)
			.unwrap()
			.set_len(600)
			.unwrap();

		match load(&path, 1024) {
			Err(StoreError::InvalidLength { expected, actual }) => {
				assert_eq!(expected, 1032);
				assert_eq!(actual, 600);
			}
			other => panic!("unexpected result: {:?}", other.map(|_| ())),
		}
	}

	#[test]
	fn test_load_missing_file() {
		let dir = TempDir::new("powdag-store").unwrap();
		match load(&dir.path().join("missing"), 64) {
			Err(StoreError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::NotFound),
			other => panic!("unexpected result: {:?}", other.map(|_| ())),
		}
	}

	#[test]
	fn test_lock_pages_is_ok_or_reported() {
		let dir = TempDir::new("powdag-store").unwrap();
		let path = dir.path().join("data");
		let file = create_and_fill(&path, 1024, pattern).unwrap();
		match file.lock() {
			Ok(()) | Err(StoreError::Lock(_)) => {}
			Err(err) => panic!("unexpected error: {}", err),
		}
		assert_eq!(&file[..], &expected(1024)[..]);
	}

	#[test]
	fn test_remove_is_best_effort() {
		let dir = TempDir::new("powdag-store").unwrap();
		let path = dir.path().join("data");
		remove(&path);
		drop(create_and_fill(&path, 64, pattern).unwrap());
		remove(&path);
		assert!(!path.exists());
	}

	#[test]
	fn test_file_names() {
		let cfg = DagConfig::ethash("RVN");
		let mut seed = [0u8; 32];
		seed[..8].copy_from_slice(&[0x29, 0x0d, 0xec, 0xd9, 0x54, 0x8b, 0x62, 0xa8]);
		let dir = Path::new("/tmp/powcache");

		let suffix = if cfg!(target_endian = "big") { ".be" } else { "" };
		assert_eq!(
			cache_path(dir, &cfg, &seed),
			dir.join(format!("cache-RVN-R23-290decd9548b62a8{}", suffix))
		);
		assert_eq!(
			l1_path(dir, &cfg, &seed),
			dir.join(format!("l1-RVN-R23-290decd9548b62a8{}", suffix))
		);
	}
}
