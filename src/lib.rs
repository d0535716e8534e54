//! Snapvault core
//!
//! The synchronization core of a collaborative photo library. Local state
//! lives in two partition databases mirroring the private and the shared
//! remote scope; every committed mutation lands in a per-partition change
//! ledger; a replay engine drains the ledger into observer notifications and
//! durable checkpoints; and a leaderless deduplication engine collapses the
//! tags that independent peers create concurrently. The remote backend is
//! only ever reached through the [`remote::RemoteSync`] trait.

pub mod config;
pub mod dedup;
pub mod history;
pub mod infrastructure;
pub mod ledger;
pub mod operations;
pub mod remote;
pub mod sharing;
pub mod store;

use crate::config::CoreConfig;
use crate::history::{HistoryError, HistoryService};
use crate::infrastructure::events::{Event, EventBus};
use crate::ledger::{ChangeRecord, CheckpointStore, LedgerError};
use crate::remote::RemoteSync;
use crate::sharing::ShareManager;
use crate::store::{Partition, PartitionStore, StoreError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Failures that make the core unusable at startup.
///
/// These are the only fatal conditions in the crate; everything after a
/// successful bootstrap surfaces as a typed, recoverable error.
#[derive(Error, Debug)]
pub enum CoreError {
	#[error(transparent)]
	Config(#[from] anyhow::Error),

	#[error(transparent)]
	Store(#[from] StoreError),

	#[error(transparent)]
	Ledger(#[from] LedgerError),
}

/// The process-scoped context for all core operations.
///
/// Constructed once at startup and passed by handle to whoever needs it;
/// there is no global lookup.
pub struct Core {
	/// Persisted configuration
	config: CoreConfig,

	/// Dual-partition entity store
	pub store: Arc<PartitionStore>,

	/// Event bus for state changes
	pub events: Arc<EventBus>,

	/// History replay worker handle
	pub history: HistoryService,

	/// Sharing lifecycle manager
	pub sharing: Arc<ShareManager>,
}

impl Core {
	/// Initialize a new core instance with the default data directory
	pub async fn new(remote: Arc<dyn RemoteSync>) -> Result<Self, CoreError> {
		let data_dir = config::default_data_dir()?;
		Self::new_with_config(data_dir, remote).await
	}

	/// Initialize a new core instance with a custom data directory
	pub async fn new_with_config(
		data_dir: PathBuf,
		remote: Arc<dyn RemoteSync>,
	) -> Result<Self, CoreError> {
		info!("Initializing core at {:?}", data_dir);

		// 1. Load or create the configuration
		let config = CoreConfig::load_or_create(&data_dir)?;
		config.ensure_directories()?;

		// 2. Open both partition databases
		let store = Arc::new(
			PartitionStore::open(&config.partitions_dir(), &config.author_tag, remote.clone())
				.await?,
		);

		// 3. Create the event bus
		let events = Arc::new(EventBus::default());

		// 4. Load the durable replay checkpoints
		let checkpoints = Arc::new(CheckpointStore::load_or_create(config.checkpoint_path())?);

		// 5. Start the history worker
		let history = HistoryService::spawn(store.clone(), checkpoints, events.clone());

		// 6. Wire up the sharing lifecycle
		let sharing = Arc::new(ShareManager::new(
			store.clone(),
			remote,
			history.clone(),
			events.clone(),
			config.identity.clone(),
		));

		events.emit(Event::CoreStarted);

		Ok(Self {
			config,
			store,
			events,
			history,
			sharing,
		})
	}

	/// Get the configuration
	pub fn config(&self) -> &CoreConfig {
		&self.config
	}

	/// Inbound "remote change available for partition P" signal.
	///
	/// Fire-and-forget; the history worker picks it up in order. Safe to call
	/// from any execution context.
	pub fn remote_change_available(&self, partition: Partition) {
		self.history.notify_remote_change(partition);
	}

	/// Process a partition's pending history and wait for the outcome
	pub async fn process_remote_change(
		&self,
		partition: Partition,
	) -> Result<Vec<ChangeRecord>, HistoryError> {
		self.history.process_remote_change(partition).await
	}

	/// Inbound sync activity or error signal from the remote collaborator.
	/// Errors are logged and re-emitted on the event bus, never swallowed.
	pub fn sync_activity(&self, partition: Option<Partition>, error: Option<String>) {
		match &error {
			Some(err) => error!(?partition, "remote sync reported an error: {err}"),
			None => debug!(?partition, "remote sync activity"),
		}
		self.events.emit(Event::SyncActivity { partition, error });
	}

	/// Shut the core down gracefully
	pub async fn shutdown(&self) {
		info!("Shutting down core");
		self.events.emit(Event::CoreShutdown);
		self.history.shutdown();
		if let Err(err) = self.config.save() {
			error!("Failed to save the configuration: {err}");
		}
	}
}

/// Install a global tracing subscriber honoring `RUST_LOG`, falling back to
/// the given filter. Embedders that bring their own subscriber skip this.
pub fn init_logging(default_filter: &str) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_filter.to_string()));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
