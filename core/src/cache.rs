//! Epoch-indexed verification caches with disk persistence, bounded LRU
//! retention and background pre-generation of the next epoch.

use std::collections::HashMap;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use either::Either;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::compute::{generate_cache, generate_l1_cache};
use crate::keccak::H256;
use crate::seed_compute::{seed_hash, SeedHashCompute};
use crate::shared::DagConfig;
use crate::store::{self, DataFile};

pub const DEFAULT_CACHE_CAPACITY: usize = 3;

const SLOW_GENERATION: Duration = Duration::from_secs(3);

/// How a `CacheManager` keeps its caches.
#[derive(Debug, Clone)]
pub struct CacheOptions {
	/// Directory for persisted caches; `None` keeps everything in memory.
	pub storage_dir: Option<PathBuf>,
	/// Number of epochs kept resident, and on disk.
	pub capacity: usize,
	/// Lock mapped files into RAM.
	pub lock_pages: bool,
}

impl Default for CacheOptions {
	fn default() -> Self {
		CacheOptions {
			storage_dir: None,
			capacity: DEFAULT_CACHE_CAPACITY,
			lock_pages: false,
		}
	}
}

impl CacheOptions {
	pub fn with_storage_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
		self.storage_dir = Some(dir.into());
		self
	}

	pub fn with_capacity(mut self, capacity: usize) -> Self {
		self.capacity = capacity.max(1);
		self
	}

	pub fn with_lock_pages(mut self, lock: bool) -> Self {
		self.lock_pages = lock;
		self
	}
}

type Buffer = Either<Vec<u8>, DataFile>;

struct CacheData {
	cache: Buffer,
	l1: Option<Buffer>,
}

/// The verification cache of one epoch, plus its L1 cache when the chain
/// uses one. Populated exactly once; read-only afterwards.
pub struct Cache {
	epoch: u64,
	data: OnceCell<CacheData>,
}

impl Cache {
	fn new(epoch: u64) -> Self {
		Cache {
			epoch,
			data: OnceCell::new(),
		}
	}

	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	pub fn is_ready(&self) -> bool {
		self.data.get().is_some()
	}

	fn data(&self) -> &CacheData {
		self.data
			.get()
			.expect("caches are populated before the manager hands them out")
	}

	pub fn cache(&self) -> &[u8] {
		&self.data().cache
	}

	pub fn l1(&self) -> Option<&[u8]> {
		self.data().l1.as_ref().map(|l1| &l1[..])
	}

	/// Whether the cache is backed by a mapped file rather than the heap.
	pub fn is_persisted(&self) -> bool {
		self.data().cache.is_right()
	}
}

struct Entry {
	cache: Arc<Cache>,
	used: u64,
}

struct State {
	caches: HashMap<u64, Entry>,
	future: Option<Arc<Cache>>,
	clock: u64,
	workers: Vec<JoinHandle<()>>,
}

struct Shared {
	cfg: DagConfig,
	options: CacheOptions,
	generated: AtomicUsize,
}

/// Hands out populated caches by epoch.
///
/// Bookkeeping happens under a short-lived lock; generation and loading run
/// outside it, serialized per cache by its one-shot latch. Requesting a new
/// epoch also starts generating the following one in the background.
pub struct CacheManager {
	shared: Arc<Shared>,
	state: Mutex<State>,
}

impl CacheManager {
	pub fn new(cfg: DagConfig, options: CacheOptions) -> Self {
		let options = CacheOptions {
			capacity: options.capacity.max(1),
			..options
		};
		CacheManager {
			shared: Arc::new(Shared {
				cfg,
				options,
				generated: AtomicUsize::new(0),
			}),
			state: Mutex::new(State {
				caches: HashMap::new(),
				future: None,
				clock: 0,
				workers: Vec::new(),
			}),
		}
	}

	pub fn config(&self) -> &DagConfig {
		&self.shared.cfg
	}

	pub fn options(&self) -> &CacheOptions {
		&self.shared.options
	}

	/// Return the cache for `epoch`, generating or loading it first if
	/// needed. Blocks while another caller populates the same epoch.
	pub fn get(&self, epoch: u64) -> Arc<Cache> {
		let cache = {
			let mut state = self.state.lock();
			state.clock += 1;
			let tick = state.clock;

			match state.caches.get_mut(&epoch) {
				Some(entry) => {
					entry.used = tick;
					entry.cache.clone()
				}
				None => self.insert(&mut state, epoch, tick),
			}
		};

		self.shared.populate(&cache);
		cache
	}

	fn insert(&self, state: &mut State, epoch: u64, tick: u64) -> Arc<Cache> {
		if state.caches.len() >= self.shared.options.capacity {
			let oldest = state
				.caches
				.iter()
				.min_by_key(|(_, entry)| entry.used)
				.map(|(epoch, _)| *epoch);
			if let Some(oldest) = oldest {
				debug!("evicting {} cache for epoch {}", self.shared.cfg.name, oldest);
				state.caches.remove(&oldest);
			}
		}

		let cache = match state.future.take() {
			Some(future) if future.epoch == epoch => {
				debug!("using pre-generated cache for epoch {}", epoch);
				future
			}
			other => {
				state.future = other;
				Arc::new(Cache::new(epoch))
			}
		};
		state.caches.insert(
			epoch,
			Entry {
				cache: cache.clone(),
				used: tick,
			},
		);

		if state.future.as_ref().map_or(true, |future| future.epoch <= epoch) {
			let future = Arc::new(Cache::new(epoch + 1));
			state.future = Some(future.clone());
			state.workers.retain(|worker| !worker.is_finished());

			let shared = self.shared.clone();
			let spawned = thread::Builder::new()
				.name(format!("cache-{}-{}", shared.cfg.name, epoch + 1))
				.spawn(move || shared.populate(&future));
			match spawned {
				Ok(worker) => state.workers.push(worker),
				Err(err) => warn!("could not start background cache generation: {}", err),
			}
		}

		cache
	}

	/// Number of resident caches, not counting the pre-generated one.
	pub fn len(&self) -> usize {
		self.state.lock().caches.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Resident epochs in ascending order.
	pub fn epochs(&self) -> Vec<u64> {
		let mut epochs: Vec<u64> = self.state.lock().caches.keys().cloned().collect();
		epochs.sort_unstable();
		epochs
	}

	/// Number of times a cache was populated, whether generated or loaded.
	pub fn generated(&self) -> usize {
		self.shared.generated.load(Ordering::SeqCst)
	}

	/// Block until every background generation started so far has finished.
	pub fn wait_background(&self) {
		let workers = mem::take(&mut self.state.lock().workers);
		join_all(workers);
	}
}

impl Drop for CacheManager {
	fn drop(&mut self) {
		join_all(mem::take(&mut self.state.get_mut().workers));
	}
}

fn join_all(workers: Vec<JoinHandle<()>>) {
	for worker in workers {
		if worker.join().is_err() {
			warn!("background cache generation panicked");
		}
	}
}

impl Shared {
	fn populate(&self, cache: &Cache) {
		cache.data.get_or_init(|| {
			self.generated.fetch_add(1, Ordering::SeqCst);
			self.build(cache.epoch)
		});
	}

	fn build(&self, epoch: u64) -> CacheData {
		let cfg = &self.cfg;
		let seed = seed_hash(cfg, epoch);
		let size = cfg.cache_size(epoch);

		let dir = match self.options.storage_dir {
			Some(ref dir) => dir,
			None => {
				let mut cache = vec![0u8; size as usize];
				self.generate(epoch, &seed, &mut cache);
				let l1 = cfg.l1_cache_bytes.map(|bytes| {
					let mut l1 = vec![0u8; bytes];
					generate_l1_cache(&mut l1, &cache, cfg.dataset_parents);
					Either::Left(l1)
				});
				return CacheData {
					cache: Either::Left(cache),
					l1,
				};
			}
		};

		let cache = self.load_or_create(&store::cache_path(dir, cfg, &seed), size, |buf| {
			self.generate(epoch, &seed, buf)
		});
		let l1 = cfg.l1_cache_bytes.map(|bytes| {
			self.load_or_create(&store::l1_path(dir, cfg, &seed), bytes as u64, |buf| {
				generate_l1_cache(buf, &cache, cfg.dataset_parents)
			})
		});

		self.remove_stale(dir, epoch);
		CacheData { cache, l1 }
	}

	fn load_or_create<F>(&self, path: &Path, size: u64, fill: F) -> Buffer
	where
		F: Fn(&mut [u8]),
	{
		let file = match store::load(path, size) {
			Ok(file) => {
				debug!("loaded {}", path.display());
				file
			}
			Err(err) => {
				debug!("no usable file at {}: {}", path.display(), err);
				match store::create_and_fill(path, size, &fill) {
					Ok(file) => {
						info!("persisted {}", path.display());
						file
					}
					Err(err) => {
						warn!("failed to persist {}, keeping it in memory: {}", path.display(), err);
						let mut buf = vec![0u8; size as usize];
						fill(&mut buf);
						return Either::Left(buf);
					}
				}
			}
		};

		if self.options.lock_pages {
			if let Err(err) = file.lock() {
				warn!("keeping {} unlocked: {}", path.display(), err);
			}
		}
		Either::Right(file)
	}

	fn generate(&self, epoch: u64, seed: &H256, dest: &mut [u8]) {
		debug!(
			"generating {} cache for epoch {} ({} bytes)",
			self.cfg.name,
			epoch,
			dest.len()
		);
		let start = Instant::now();
		generate_cache(dest, seed, self.cfg.cache_rounds);

		let elapsed = start.elapsed();
		if elapsed > SLOW_GENERATION {
			info!(
				"generated {} cache for epoch {} in {:?}",
				self.cfg.name, epoch, elapsed
			);
		} else {
			debug!(
				"generated {} cache for epoch {} in {:?}",
				self.cfg.name, epoch, elapsed
			);
		}
	}

	// Files of epochs that fell out of the retention window.
	fn remove_stale(&self, dir: &Path, epoch: u64) {
		let capacity = self.options.capacity as u64;
		if epoch < capacity {
			return;
		}

		let mut seeds = SeedHashCompute::default();
		for old in 0..=epoch - capacity {
			let seed = seeds.hash_epoch(&self.cfg, old);
			store::remove(&store::cache_path(dir, &self.cfg, &seed));
			store::remove(&store::l1_path(dir, &self.cfg, &seed));
		}
	}
}
