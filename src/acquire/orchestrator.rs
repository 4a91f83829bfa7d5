use crate::acquire::cache::ImageCache;
use crate::catalog::source::{AssetCatalog, DecodeRequest, DecodedImage};
use crate::foundation::core::AssetId;
use crate::foundation::error::{CollageError, CollageResult};
use crate::selection::picker::CollageRequest;
use std::collections::{BTreeMap, BTreeSet};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

/// Completed versus total decode attempts of one acquisition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct AcquisitionProgress {
    /// Distinct assets whose decode resolved (success or failure).
    pub completed: usize,
    /// Distinct assets in the request.
    pub total: usize,
}

impl AcquisitionProgress {
    /// Return `true` once every asset has been attempted.
    pub fn is_complete(self) -> bool {
        self.completed >= self.total
    }
}

/// Dispatches per-asset decodes onto a worker pool.
///
/// Every [`Orchestrator::acquire`] call gets its own channel, cache and generation number, so
/// acquisitions never share state.
pub struct Orchestrator {
    catalog: Arc<dyn AssetCatalog>,
    pool: Arc<rayon::ThreadPool>,
    next_generation: AtomicU64,
}

impl Orchestrator {
    /// Build an orchestrator with a dedicated decode pool. `threads: None` uses rayon defaults.
    pub fn new(catalog: Arc<dyn AssetCatalog>, threads: Option<usize>) -> CollageResult<Self> {
        Ok(Self {
            catalog,
            pool: Arc::new(build_thread_pool(threads)?),
            next_generation: AtomicU64::new(1),
        })
    }

    /// Catalog the orchestrator decodes from.
    pub fn catalog(&self) -> &Arc<dyn AssetCatalog> {
        &self.catalog
    }

    /// Start decoding every distinct asset of `request` at a `target_side` square.
    #[tracing::instrument(skip_all, fields(count = request.len(), target_side = target_side))]
    pub fn acquire(&self, request: &CollageRequest, target_side: u32) -> AcquisitionHandle {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let distinct = request.distinct();
        let (tx, rx) = mpsc::channel::<Completion>();
        let cancel = Arc::new(AtomicBool::new(false));
        let decode_req = DecodeRequest::full_resolution(target_side);

        tracing::debug!(generation, assets = distinct.len(), "dispatching decodes");
        for asset in &distinct {
            let tx = tx.clone();
            let cancel = Arc::clone(&cancel);
            let catalog = Arc::clone(&self.catalog);
            let asset = asset.clone();
            self.pool.spawn(move || {
                if cancel.load(Ordering::Acquire) {
                    return;
                }
                let result = decode_guarded(catalog.as_ref(), &asset, &decode_req);
                if cancel.load(Ordering::Acquire) {
                    return;
                }
                // The handle may already be gone; a closed channel just drops the result.
                let _ = tx.send(Completion {
                    generation,
                    asset,
                    result,
                });
            });
        }

        AcquisitionHandle {
            request: request.clone(),
            generation,
            expected: distinct.into_iter().collect(),
            rx,
            cancel,
            resolved: BTreeSet::new(),
            cache: ImageCache::new(),
            failed: BTreeMap::new(),
        }
    }
}

fn decode_guarded(
    catalog: &dyn AssetCatalog,
    asset: &AssetId,
    req: &DecodeRequest,
) -> CollageResult<DecodedImage> {
    std::panic::catch_unwind(AssertUnwindSafe(|| catalog.decode(asset, req)))
        .unwrap_or_else(|_| Err(CollageError::decode(asset, "decoder panicked")))
}

fn build_thread_pool(threads: Option<usize>) -> CollageResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(CollageError::validation(
            "acquisition 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("collage-decode-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CollageError::validation(format!("failed to build decode thread pool: {e}")))
}

#[derive(Debug)]
struct Completion {
    generation: u64,
    asset: AssetId,
    result: CollageResult<DecodedImage>,
}

/// Live acquisition of one [`CollageRequest`].
///
/// The handle is the single aggregator of its decode results. Dropping it cancels the acquisition:
/// queued decodes are skipped and late results are discarded together with the cache.
pub struct AcquisitionHandle {
    request: CollageRequest,
    generation: u64,
    expected: BTreeSet<AssetId>,
    rx: mpsc::Receiver<Completion>,
    cancel: Arc<AtomicBool>,
    resolved: BTreeSet<AssetId>,
    cache: ImageCache,
    failed: BTreeMap<AssetId, String>,
}

impl std::fmt::Debug for AcquisitionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionHandle")
            .field("generation", &self.generation)
            .field("progress", &self.progress())
            .finish_non_exhaustive()
    }
}

impl AcquisitionHandle {
    /// Generation number distinguishing this acquisition from earlier ones.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Request being acquired.
    pub fn request(&self) -> &CollageRequest {
        &self.request
    }

    /// Images decoded so far.
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Progress as of the last drain of the completion channel.
    pub fn progress(&self) -> AcquisitionProgress {
        AcquisitionProgress {
            completed: self.resolved.len(),
            total: self.expected.len(),
        }
    }

    /// Drain completions that already arrived, without blocking.
    pub fn poll(&mut self) -> AcquisitionProgress {
        while let Ok(c) = self.rx.try_recv() {
            self.absorb(c);
        }
        self.progress()
    }

    /// Block until every asset has been attempted.
    pub fn wait(self) -> Acquired {
        self.wait_with(|_| {})
    }

    /// Block until every asset has been attempted, reporting each newly resolved asset.
    pub fn wait_with(mut self, mut on_progress: impl FnMut(AcquisitionProgress)) -> Acquired {
        while !self.progress().is_complete() {
            match self.rx.recv() {
                Ok(c) => {
                    if self.absorb(c) {
                        on_progress(self.progress());
                    }
                }
                Err(_) => {
                    self.abandon_unresolved("decode worker exited without reporting");
                    on_progress(self.progress());
                }
            }
        }
        self.finish()
    }

    /// Like [`AcquisitionHandle::wait_with`] but gives up after `timeout`.
    ///
    /// Assets still outstanding at the deadline are reported in [`Acquired::pending`] and their
    /// late results are dropped.
    pub fn wait_timeout_with(
        mut self,
        timeout: Duration,
        mut on_progress: impl FnMut(AcquisitionProgress),
    ) -> Acquired {
        let deadline = Instant::now() + timeout;
        while !self.progress().is_complete() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(c) => {
                    if self.absorb(c) {
                        on_progress(self.progress());
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    tracing::warn!(
                        generation = self.generation,
                        progress = ?self.progress(),
                        "acquisition timed out; composing with partial coverage"
                    );
                    break;
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    self.abandon_unresolved("decode worker exited without reporting");
                    on_progress(self.progress());
                }
            }
        }
        self.finish()
    }

    /// Like [`AcquisitionHandle::wait`] but gives up after `timeout`.
    pub fn wait_timeout(self, timeout: Duration) -> Acquired {
        self.wait_timeout_with(timeout, |_| {})
    }

    /// Stop the acquisition and discard everything it produced.
    pub fn cancel(self) {
        tracing::debug!(generation = self.generation, "acquisition cancelled");
    }

    /// Fold one completion into the cache. Returns `true` when it resolved a new asset.
    fn absorb(&mut self, c: Completion) -> bool {
        if c.generation != self.generation {
            tracing::warn!(
                stale = c.generation,
                live = self.generation,
                asset = %c.asset,
                "dropping completion from a superseded acquisition"
            );
            return false;
        }
        if !self.expected.contains(&c.asset) || !self.resolved.insert(c.asset.clone()) {
            return false;
        }
        match c.result {
            Ok(img) => {
                tracing::debug!(asset = %c.asset, w = img.width(), h = img.height(), "decoded");
                self.cache.insert(c.asset, img);
            }
            Err(e) => {
                tracing::warn!(asset = %c.asset, error = %e, "decode failed; cell stays empty");
                self.failed.insert(c.asset, e.to_string());
            }
        }
        true
    }

    fn abandon_unresolved(&mut self, reason: &str) {
        let missing: Vec<AssetId> = self.expected.difference(&self.resolved).cloned().collect();
        for asset in missing {
            tracing::warn!(asset = %asset, reason, "decode never resolved");
            self.failed.insert(asset.clone(), reason.to_string());
            self.resolved.insert(asset);
        }
    }

    fn finish(mut self) -> Acquired {
        let pending = self.expected.difference(&self.resolved).cloned().collect();
        Acquired {
            request: self.request.clone(),
            cache: std::mem::take(&mut self.cache),
            failed: std::mem::take(&mut self.failed),
            pending,
        }
    }
}

impl Drop for AcquisitionHandle {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
    }
}

/// Terminal result of an acquisition.
#[derive(Clone, Debug)]
pub struct Acquired {
    /// Request that was acquired.
    pub request: CollageRequest,
    /// Successfully decoded images.
    pub cache: ImageCache,
    /// Assets whose decode failed, with the cause.
    pub failed: BTreeMap<AssetId, String>,
    /// Assets still outstanding when a bounded wait gave up.
    pub pending: Vec<AssetId>,
}

impl Acquired {
    /// Return `true` when every asset resolved (decoded or failed).
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Distinct assets with an image.
    pub fn decoded(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/acquire/orchestrator.rs"]
mod tests;
