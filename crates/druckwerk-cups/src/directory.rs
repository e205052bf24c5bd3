// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer directory: owns the last status snapshot's printer records and
// the refresh policy around them.
//
// First read performs a blocking cold load; thereafter reads return the
// cached list immediately and refresh in the background. Refreshes carry a
// monotonic generation so a stale in-flight refresh can never overwrite a
// newer cache entry.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use druckwerk_core::config::CupsConfig;
use druckwerk_core::error::{DruckError, Result};
use druckwerk_core::types::{JobHandle, PrinterRecord, PrintRequest};

use crate::exec::{CommandRunner, SystemRunner};
use crate::{extract, snapshot, submit};

/// Refresh interval used when `auto_refresh` is given none.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(15_000);

/// Cached printer list plus its bookkeeping.
#[derive(Debug, Default)]
struct DirectoryState {
    printers: Vec<PrinterRecord>,
    loaded: bool,
    /// Generation of the snapshot currently installed.
    installed_generation: u64,
    last_refreshed: Option<DateTime<Utc>>,
}

struct DirectoryInner {
    runner: Arc<dyn CommandRunner>,
    config: CupsConfig,
    state: Mutex<DirectoryState>,
    /// Claimed by each load/refresh before it starts.
    generation: AtomicU64,
    /// Currently installed auto-refresh timer, if any.
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DirectoryInner {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.refresh_task.lock()
            && let Some(task) = slot.take()
        {
            task.abort();
        }
    }
}

/// In-process cache of the last known printer list.
///
/// Cheap to clone; clones share the cache and the refresh timer. The
/// command runner is injectable for tests — see [`with_runner`].
///
/// [`with_runner`]: Self::with_runner
#[derive(Clone)]
pub struct PrinterDirectory {
    inner: Arc<DirectoryInner>,
}

impl Default for PrinterDirectory {
    fn default() -> Self {
        Self::new(CupsConfig::default())
    }
}

impl PrinterDirectory {
    /// Directory backed by the real print subsystem commands.
    pub fn new(config: CupsConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    /// Directory with an injected command runner.
    pub fn with_runner(config: CupsConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            inner: Arc::new(DirectoryInner {
                runner,
                config,
                state: Mutex::new(DirectoryState::default()),
                generation: AtomicU64::new(0),
                refresh_task: Mutex::new(None),
            }),
        }
    }

    /// Current best-known printer list.
    ///
    /// On the first call this blocks on a cold load (five sequential status
    /// queries). Afterwards the cached list is returned immediately and a
    /// concurrent refresh is kicked off in the background; its result is
    /// only visible to future calls.
    #[instrument(skip(self))]
    pub async fn list_printers(&self) -> Result<Vec<PrinterRecord>> {
        let cached = {
            let state = self.lock_state();
            state.loaded.then(|| state.printers.clone())
        };

        match cached {
            None => self.cold_load().await,
            Some(list) => {
                self.spawn_refresh();
                Ok(list)
            }
        }
    }

    /// Look up a printer by name in the current cache.
    ///
    /// When the directory is unloaded, or no auto-refresh timer keeps the
    /// cache warm, a full [`list_printers`](Self::list_printers) pass runs
    /// first so the answer is as fresh as possible. A missing printer is
    /// `Ok(None)`, not an error.
    pub async fn get_printer(&self, name: &str) -> Result<Option<PrinterRecord>> {
        let loaded = self.lock_state().loaded;
        let timer_active = self
            .inner
            .refresh_task
            .lock()
            .expect("refresh task lock poisoned")
            .is_some();
        if !loaded || !timer_active {
            self.list_printers().await?;
        }

        Ok(self
            .lock_state()
            .printers
            .iter()
            .find(|p| p.name == name)
            .cloned())
    }

    /// When the cache was last (re)populated.
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.lock_state().last_refreshed
    }

    /// (Re)install the periodic refresh timer.
    ///
    /// The timer calls [`list_printers`](Self::list_printers) on every tick;
    /// installing a new timer cancels the prior one, so exactly one is ever
    /// active. The timer holds only a weak handle to the directory and dies
    /// with it.
    pub fn auto_refresh(&self, every: Option<Duration>) {
        let every = every.unwrap_or(DEFAULT_REFRESH_INTERVAL);
        let weak = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let Some(inner) = Weak::upgrade(&weak) else {
                    break;
                };
                let directory = PrinterDirectory { inner };
                if let Err(e) = directory.list_printers().await {
                    warn!(error = %e, "scheduled printer refresh failed");
                }
            }
        });

        info!(interval_ms = every.as_millis() as u64, "auto-refresh timer installed");
        let mut slot = self
            .inner
            .refresh_task
            .lock()
            .expect("refresh task lock poisoned");
        if let Some(prior) = slot.replace(task) {
            prior.abort();
        }
    }

    /// Submit a print job to a printer known to the directory.
    ///
    /// The request is validated first, then the target printer's existence
    /// is resolved against the (possibly refreshed) cache before the job is
    /// handed to the submission command.
    #[instrument(skip(self, request), fields(printer = %request.printer))]
    pub async fn print(&self, request: &PrintRequest) -> Result<JobHandle> {
        submit::validate(request)?;
        if self.get_printer(&request.printer).await?.is_none() {
            return Err(DruckError::PrinterNotFound(request.printer.clone()));
        }
        submit::submit(self.inner.runner.as_ref(), &self.inner.config, request).await
    }

    /// Callback-style submission for callers without a future in hand.
    ///
    /// `options` become repeated `-o key=value` flags on the same
    /// submission path as [`print`](Self::print). Both callbacks are
    /// required by the signature; errors reach `on_error` instead of being
    /// returned.
    pub fn print_direct<S, E>(
        &self,
        mut request: PrintRequest,
        options: BTreeMap<String, String>,
        on_success: S,
        on_error: E,
    ) where
        S: FnOnce(JobHandle) + Send + 'static,
        E: FnOnce(DruckError) + Send + 'static,
    {
        for (key, value) in options {
            request.extra_args.push("-o".into());
            request.extra_args.push(format!("{key}={value}"));
        }

        let directory = self.clone();
        tokio::spawn(async move {
            match directory.print(&request).await {
                Ok(handle) => on_success(handle),
                Err(e) => on_error(e),
            }
        });
    }

    // -- internal helpers ---------------------------------------------------

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DirectoryState> {
        self.inner.state.lock().expect("directory state lock poisoned")
    }

    fn claim_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Blocking snapshot + extract, then install. Runs the five status
    /// queries sequentially on a blocking worker.
    async fn cold_load(&self) -> Result<Vec<PrinterRecord>> {
        let generation = self.claim_generation();
        let runner = Arc::clone(&self.inner.runner);
        let config = self.inner.config.clone();

        let snapshot =
            tokio::task::spawn_blocking(move || snapshot::collect_blocking(runner.as_ref(), &config))
                .await
                .expect("cold load task panicked")?;

        let records = extract::extract_printers(&snapshot);
        info!(count = records.len(), "printer directory loaded");
        self.install(generation, records.clone());
        Ok(records)
    }

    /// Fire-and-forget concurrent refresh. Failures are logged — the
    /// directory has no channel to report them to callers.
    fn spawn_refresh(&self) {
        let directory = self.clone();
        let generation = self.claim_generation();

        tokio::spawn(async move {
            let inner = &directory.inner;
            match snapshot::collect(inner.runner.as_ref(), &inner.config).await {
                Ok(snapshot) => {
                    let records = extract::extract_printers(&snapshot);
                    directory.install(generation, records);
                }
                Err(e) => warn!(error = %e, "background printer refresh failed"),
            }
        });
    }

    /// Install a refresh result unless a newer generation landed first.
    fn install(&self, generation: u64, records: Vec<PrinterRecord>) {
        let mut state = self.lock_state();
        if generation < state.installed_generation {
            debug!(
                generation,
                installed = state.installed_generation,
                "discarding stale refresh result"
            );
            return;
        }
        state.printers = records;
        state.loaded = true;
        state.installed_generation = generation;
        state.last_refreshed = Some(Utc::now());
    }
}
