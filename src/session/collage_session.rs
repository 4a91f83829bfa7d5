use crate::acquire::orchestrator::{Acquired, AcquisitionHandle, AcquisitionProgress, Orchestrator};
use crate::catalog::source::AssetCatalog;
use crate::composite::compositor::{SavedCollage, persist, render};
use crate::config::opts::CollageOpts;
use crate::foundation::core::{AssetId, StoredAssetId};
use crate::foundation::error::{CollageError, CollageResult};
use crate::layout::grid::{GridLayout, LayoutFn, compute_layout};
use crate::selection::picker::{CollageRequest, Selection, Toggle};
use crate::store::sink::PhotoStore;
use std::sync::{Arc, mpsc};

/// Where a session is in the pick → acquire → save workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Picking photos; no acquisition running.
    Selecting,
    /// Decoding the committed request.
    Acquiring(AcquisitionProgress),
    /// Every asset was attempted (or the wait bound expired); ready to save.
    Ready,
    /// Rendering and committing.
    Saving,
    /// The last save succeeded.
    Saved(StoredAssetId),
    /// The last save failed; `save` may be called again.
    Failed(String),
}

/// Notifications delivered to [`CollageSession::subscribe`] receivers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Acquisition progress changed.
    Progress(AcquisitionProgress),
    /// Acquisition finished; sent once per committed request.
    AcquisitionComplete {
        /// Generation of the finished acquisition.
        generation: u64,
        /// Distinct assets with an image.
        decoded: usize,
        /// Distinct assets whose decode failed.
        failed: usize,
        /// Distinct assets abandoned at the wait bound.
        pending: usize,
    },
    /// The composite was committed.
    Saved(StoredAssetId),
    /// Saving failed with the given cause.
    Failed(String),
}

/// One user-facing collage workflow over a catalog and a photo store.
///
/// A new [`CollageSession::begin`] supersedes the previous acquisition: its handle is dropped,
/// which cancels outstanding decodes and discards its cache.
pub struct CollageSession {
    opts: CollageOpts,
    selection: Selection,
    orchestrator: Orchestrator,
    store: Arc<dyn PhotoStore>,
    layout: LayoutFn,
    active: Option<AcquisitionHandle>,
    ready: Option<Acquired>,
    status: SessionStatus,
    subscribers: Vec<mpsc::Sender<SessionEvent>>,
}

impl CollageSession {
    /// Create a session after validating `opts`.
    pub fn new(
        catalog: Arc<dyn AssetCatalog>,
        store: Arc<dyn PhotoStore>,
        opts: CollageOpts,
    ) -> CollageResult<Self> {
        opts.validate()?;
        let orchestrator = Orchestrator::new(catalog, opts.threads)?;
        Ok(Self {
            opts,
            selection: Selection::new(),
            orchestrator,
            store,
            layout: compute_layout,
            active: None,
            ready: None,
            status: SessionStatus::Selecting,
            subscribers: Vec::new(),
        })
    }

    /// Replace the layout function used by both preview and render.
    pub fn with_layout(mut self, layout: LayoutFn) -> Self {
        self.layout = layout;
        self
    }

    /// Session options.
    pub fn opts(&self) -> &CollageOpts {
        &self.opts
    }

    /// Current workflow status.
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Request being acquired or ready to save, if any.
    pub fn request(&self) -> Option<&CollageRequest> {
        self.active
            .as_ref()
            .map(|h| h.request())
            .or_else(|| self.ready.as_ref().map(|a| &a.request))
    }

    /// Register a listener for session events.
    pub fn subscribe(&mut self) -> mpsc::Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Select or deselect `id`. See [`Selection::toggle`].
    pub fn toggle(&mut self, id: &AssetId) -> Toggle {
        self.selection.toggle(id)
    }

    /// 1-based selection order of `id`.
    pub fn order_number(&self, id: &AssetId) -> Option<usize> {
        self.selection.order_number(id)
    }

    /// Clear the selection and abandon any acquisition.
    pub fn reset_selection(&mut self) {
        self.cancel();
        self.selection.clear();
    }

    /// Freeze the selection into a request and start acquiring it.
    ///
    /// Fails with [`CollageError::InsufficientSelection`] (and changes nothing) when fewer than two
    /// photos are selected.
    #[tracing::instrument(skip(self), fields(selected = self.selection.len()))]
    pub fn begin(&mut self) -> CollageResult<&CollageRequest> {
        let request = self.selection.commit()?;
        self.active = None;
        self.ready = None;

        let handle = self.orchestrator.acquire(&request, self.opts.target_side);
        let progress = handle.progress();
        tracing::info!(generation = handle.generation(), "acquisition started");
        self.status = SessionStatus::Acquiring(progress);
        broadcast(&mut self.subscribers, SessionEvent::Progress(progress));

        let handle = self.active.insert(handle);
        Ok(handle.request())
    }

    /// Drain finished decodes without blocking and report progress.
    pub fn poll_progress(&mut self) -> Option<AcquisitionProgress> {
        let handle = self.active.as_mut()?;
        let before = handle.progress();
        let now = handle.poll();
        if now != before {
            self.status = SessionStatus::Acquiring(now);
            broadcast(&mut self.subscribers, SessionEvent::Progress(now));
        }
        if now.is_complete() {
            self.wait_ready();
        }
        Some(now)
    }

    /// Layout for a live preview surface of `surface_side` units.
    ///
    /// Uses the same layout function as the saved render, with the preview spacing.
    pub fn preview_layout(&self, surface_side: f64) -> GridLayout {
        let count = self
            .request()
            .map(CollageRequest::len)
            .unwrap_or_else(|| self.selection.len());
        (self.layout)(count, surface_side, self.opts.preview_spacing)
    }

    /// Return `true` when `id` already has a decoded image for the preview.
    pub fn is_decoded(&self, id: &AssetId) -> bool {
        match (&self.active, &self.ready) {
            (Some(handle), _) => handle.cache().contains(id),
            (None, Some(acquired)) => acquired.cache.contains(id),
            (None, None) => false,
        }
    }

    /// Wait for acquisition, render the composite and commit it to the store.
    ///
    /// A persistence failure leaves the decoded images in place so `save` can simply be called
    /// again.
    #[tracing::instrument(skip(self))]
    pub fn save(&mut self) -> CollageResult<SavedCollage> {
        self.wait_ready();
        let Some(acquired) = self.ready.as_ref() else {
            return Err(CollageError::validation(
                "no collage in progress; call begin first",
            ));
        };

        if acquired.cache.is_empty() && self.opts.require_any_image {
            let err = CollageError::NoImagesDecoded {
                total: acquired.request.distinct().len(),
            };
            self.status = SessionStatus::Failed(err.to_string());
            broadcast(&mut self.subscribers, SessionEvent::Failed(err.to_string()));
            return Err(err);
        }

        self.status = SessionStatus::Saving;
        let side = self.opts.canvas_side;
        let layout = (self.layout)(acquired.request.len(), f64::from(side), self.opts.spacing);
        let collage = render(
            &acquired.request,
            &acquired.cache,
            &layout,
            side,
            self.opts.background,
        )?;

        match persist(collage, self.store.as_ref()) {
            Ok(saved) => {
                self.ready = None;
                self.status = SessionStatus::Saved(saved.stored.clone());
                broadcast(
                    &mut self.subscribers,
                    SessionEvent::Saved(saved.stored.clone()),
                );
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(error = %e, "saving collage failed");
                self.status = SessionStatus::Failed(e.to_string());
                broadcast(&mut self.subscribers, SessionEvent::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Abandon the current acquisition (if any) and return to picking.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.cancel();
        }
        self.ready = None;
        self.status = SessionStatus::Selecting;
    }

    /// Block until the running acquisition completes (or hits the configured wait bound).
    ///
    /// Returns `true` when decoded images are ready to render.
    pub fn wait_ready(&mut self) -> bool {
        let Some(handle) = self.active.take() else {
            return self.ready.is_some();
        };
        let generation = handle.generation();
        let subscribers = &mut self.subscribers;
        let on_progress = |p: AcquisitionProgress| {
            broadcast(subscribers, SessionEvent::Progress(p));
        };
        let acquired = match self.opts.acquire_timeout() {
            Some(t) => handle.wait_timeout_with(t, on_progress),
            None => handle.wait_with(on_progress),
        };

        tracing::info!(
            generation,
            decoded = acquired.decoded(),
            failed = acquired.failed.len(),
            pending = acquired.pending.len(),
            "acquisition complete"
        );
        broadcast(
            &mut self.subscribers,
            SessionEvent::AcquisitionComplete {
                generation,
                decoded: acquired.decoded(),
                failed: acquired.failed.len(),
                pending: acquired.pending.len(),
            },
        );
        self.status = SessionStatus::Ready;
        self.ready = Some(acquired);
        true
    }
}

fn broadcast(subscribers: &mut Vec<mpsc::Sender<SessionEvent>>, ev: SessionEvent) {
    subscribers.retain(|tx| tx.send(ev.clone()).is_ok());
}

#[cfg(test)]
#[path = "../../tests/unit/session/collage_session.rs"]
mod tests;
