use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use game_core::{Clock, LocalData, LocalStore, MergeEngine};
use game_types::{Snapshot, SyncCode, SyncRecord};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_STATUS_LINGER_MS;
use crate::{RemoteStore, SyncConfig, SyncError, WriteOutcome};

/// Writes per cycle: the first attempt plus one retry after a conflict.
pub const MAX_WRITE_ATTEMPTS: usize = 2;

/// What the sync indicator shows. `Success` and `Error` are transient and
/// fall back to `Idle` after the configured linger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Success,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub code: SyncCode,
    /// Remote version the local state now matches.
    pub version: u64,
    /// Write attempts used; 0 for pull-only cycles.
    pub attempts: usize,
    pub synced_at: i64,
}

/// Result of a background trigger. Failures are values here, never errors
/// the game has to handle.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Sync is off or has no code.
    Skipped,
    Synced(SyncReport),
    Failed(SyncError),
}

impl SyncOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced(_))
    }
}

/// Runs read/merge/write cycles against a [`RemoteStore`].
pub struct SyncClient<R: RemoteStore> {
    remote: R,
    clock: Arc<dyn Clock>,
    status: Arc<watch::Sender<SyncStatus>>,
    /// Bumped when a cycle starts; a linger reset only applies to its own cycle.
    cycle: Arc<AtomicU64>,
    status_linger: Duration,
}

impl<R: RemoteStore> SyncClient<R> {
    pub fn new(remote: R, clock: Arc<dyn Clock>) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            remote,
            clock,
            status: Arc::new(status),
            cycle: Arc::new(AtomicU64::new(0)),
            status_linger: Duration::from_millis(DEFAULT_STATUS_LINGER_MS),
        }
    }

    /// A client using the linger from `config`.
    pub fn with_config(remote: R, clock: Arc<dyn Clock>, config: &SyncConfig) -> Self {
        Self::new(remote, clock).with_status_linger(config.status_linger)
    }

    pub fn with_status_linger(mut self, linger: Duration) -> Self {
        self.status_linger = linger;
        self
    }

    pub fn status_linger(&self) -> Duration {
        self.status_linger
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Mint a remote record seeded with `snapshot` at version 1.
    pub async fn generate_code(&self, snapshot: &Snapshot) -> Result<SyncCode, SyncError> {
        let code = self.remote.generate(snapshot).await?;
        info!("Generated sync code {}", code);
        Ok(code)
    }

    /// Fetch the remote record for a user-entered code. The shape is checked
    /// before any request goes out.
    pub async fn pull(&self, raw_code: &str) -> Result<SyncRecord, SyncError> {
        let code = SyncCode::parse(raw_code)?;
        self.remote.fetch(&code).await
    }

    /// Pull, merge, apply locally, then write at the next version.
    ///
    /// A conflicting write is merged with the record that won and retried
    /// once; a second conflict ends the cycle with [`SyncError::Conflict`].
    /// The local state keeps every merge applied along the way.
    pub async fn push_with_merge<S: LocalStore>(
        &self,
        code: &SyncCode,
        local: &mut LocalData<S>,
    ) -> Result<SyncReport, SyncError> {
        let record = self.remote.fetch(code).await?;
        let mut merged =
            MergeEngine::merge(&local.snapshot(), &record.data, self.clock.now_millis());
        local.apply_snapshot(&merged);

        let mut target_version = record.version + 1;
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!("Writing {} at version {} (attempt {})", code, target_version, attempts);

            match self.remote.write(code, &merged, target_version).await? {
                WriteOutcome::Written { version } => {
                    return Ok(self.record_success(code, version, attempts, local));
                }
                WriteOutcome::Conflict {
                    current_version,
                    current_data,
                } => {
                    if attempts >= MAX_WRITE_ATTEMPTS {
                        warn!(
                            "Giving up on {} after {} conflicting writes (remote at version {})",
                            code, attempts, current_version
                        );
                        return Err(SyncError::Conflict { current_version });
                    }

                    info!(
                        "Remote {} moved to version {} during sync, merging again",
                        code, current_version
                    );
                    merged = MergeEngine::merge(&merged, &current_data, self.clock.now_millis());
                    local.apply_snapshot(&merged);
                    target_version = current_version + 1;
                }
            }
        }
    }

    /// Pull and merge into local state without writing back.
    pub async fn pull_and_merge<S: LocalStore>(
        &self,
        code: &SyncCode,
        local: &mut LocalData<S>,
    ) -> Result<SyncReport, SyncError> {
        let record = self.remote.fetch(code).await?;
        let merged = MergeEngine::merge(&local.snapshot(), &record.data, self.clock.now_millis());
        local.apply_snapshot(&merged);
        Ok(self.record_success(code, record.version, 0, local))
    }

    /// Switch sync on with a fresh code holding this device's data.
    pub async fn enable<S: LocalStore>(
        &self,
        local: &mut LocalData<S>,
    ) -> Result<SyncCode, SyncError> {
        let code = self.tracked(self.generate_code(&local.snapshot())).await?;
        let now = self.clock.now_millis();
        local.update_config(|config| {
            config.sync_enabled = true;
            config.sync_code = Some(code.clone());
            config.last_version = Some(1);
            config.last_synced_at = Some(now);
        });
        Ok(code)
    }

    /// Join an existing code from another device: validate, pull, merge,
    /// then remember the code.
    pub async fn adopt_code<S: LocalStore>(
        &self,
        raw_code: &str,
        local: &mut LocalData<S>,
    ) -> Result<SyncReport, SyncError> {
        let code = SyncCode::parse(raw_code)?;
        let report = self.tracked(self.pull_and_merge(&code, local)).await?;
        local.update_config(|config| {
            config.sync_enabled = true;
            config.sync_code = Some(code.clone());
        });
        info!("Adopted sync code {} at version {}", code, report.version);
        Ok(report)
    }

    /// Stop syncing. The code is kept so it can be shown or re-enabled.
    pub fn disable<S: LocalStore>(&self, local: &mut LocalData<S>) {
        local.update_config(|config| config.sync_enabled = false);
        info!("Sync disabled");
    }

    /// Background push after a finished round.
    pub async fn sync_after_game<S: LocalStore>(&self, local: &mut LocalData<S>) -> SyncOutcome {
        let Some(code) = local.config().active_code().cloned() else {
            return SyncOutcome::Skipped;
        };
        into_outcome(self.tracked(self.push_with_merge(&code, local)).await)
    }

    /// User-requested push.
    pub async fn sync_now<S: LocalStore>(
        &self,
        local: &mut LocalData<S>,
    ) -> Result<SyncReport, SyncError> {
        let code = local
            .config()
            .active_code()
            .cloned()
            .ok_or(SyncError::NotConfigured)?;
        self.tracked(self.push_with_merge(&code, local)).await
    }

    /// Opportunistic pull when the app opens. Nothing new to push yet.
    pub async fn startup_sync<S: LocalStore>(&self, local: &mut LocalData<S>) -> SyncOutcome {
        let Some(code) = local.config().active_code().cloned() else {
            return SyncOutcome::Skipped;
        };
        into_outcome(self.tracked(self.pull_and_merge(&code, local)).await)
    }

    fn record_success<S: LocalStore>(
        &self,
        code: &SyncCode,
        version: u64,
        attempts: usize,
        local: &mut LocalData<S>,
    ) -> SyncReport {
        let synced_at = self.clock.now_millis();
        local.update_config(|config| {
            config.last_version = Some(version);
            config.last_synced_at = Some(synced_at);
        });
        SyncReport {
            code: code.clone(),
            version,
            attempts,
            synced_at,
        }
    }

    /// Publish `Syncing`, run the cycle, publish its result.
    async fn tracked<T>(
        &self,
        cycle: impl Future<Output = Result<T, SyncError>>,
    ) -> Result<T, SyncError> {
        let generation = self.cycle.fetch_add(1, Ordering::SeqCst) + 1;
        self.status.send_replace(SyncStatus::Syncing);
        let result = cycle.await;
        match &result {
            Ok(_) => self.settle(SyncStatus::Success, generation),
            Err(e) => {
                warn!("Sync failed: {}", e);
                self.settle(SyncStatus::Error(e.to_string()), generation);
            }
        }
        result
    }

    fn settle(&self, status: SyncStatus, generation: u64) {
        self.status.send_replace(status);

        if self.status_linger.is_zero() {
            self.status.send_replace(SyncStatus::Idle);
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.status.send_replace(SyncStatus::Idle);
            return;
        };

        let sender = self.status.clone();
        let cycle = self.cycle.clone();
        let reset_at = tokio::time::Instant::now() + self.status_linger;
        runtime.spawn(async move {
            tokio::time::sleep_until(reset_at).await;
            // A newer cycle may have started meanwhile; leave its status alone.
            sender.send_if_modified(|current| {
                if cycle.load(Ordering::SeqCst) == generation {
                    *current = SyncStatus::Idle;
                    true
                } else {
                    false
                }
            });
        });
    }
}

fn into_outcome(result: Result<SyncReport, SyncError>) -> SyncOutcome {
    match result {
        Ok(report) => SyncOutcome::Synced(report),
        Err(e) => SyncOutcome::Failed(e),
    }
}
