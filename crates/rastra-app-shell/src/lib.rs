//! Host loop that ties Rastra's retained-rendering pieces together.
//!
//! A [`FrameHost`] owns the surface cache, the frame-delayed disposer, the
//! invalidation queue and the set of attached nodes. Producers on any thread
//! enqueue repaint work keyed by node id; [`FrameHost::process_frame`] drains
//! it once per frame and then lets the disposer release surfaces that are no
//! longer in flight.

mod pointer_router;

pub use pointer_router::PointerRouter;

use rastra_core::sync::lock;
use rastra_core::{ControlsTracker, KeyedActionQueue, NodeId, TrackedNode};
use rastra_render_common::{
    DisposalConfig, DisposeManager, FrameDisposer, SurfaceBackend, SurfaceCacheConfig,
    SurfaceCacheManager,
};
use std::sync::{Arc, Mutex};
use web_time::Instant;

/// Configuration for a [`FrameHost`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostSettings {
    pub cache: SurfaceCacheConfig,
    pub disposal: DisposalConfig,
}

impl HostSettings {
    pub fn with_cache(mut self, cache: SurfaceCacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_disposal(mut self, disposal: DisposalConfig) -> Self {
        self.disposal = disposal;
        self
    }
}

/// What one call to [`FrameHost::process_frame`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    /// Queued repaint actions that ran.
    pub actions_run: usize,
    /// Retired surfaces released by the disposer.
    pub surfaces_released: usize,
    /// Retired surfaces still held for in-flight frames.
    pub surfaces_pending: usize,
    pub attached_nodes: usize,
}

pub type InvalidationQueue = KeyedActionQueue<NodeId>;

pub struct FrameHost<B: SurfaceBackend, N> {
    settings: HostSettings,
    surfaces: Arc<SurfaceCacheManager<B>>,
    disposer: Arc<FrameDisposer<B::Surface>>,
    invalidations: Arc<InvalidationQueue>,
    nodes: ControlsTracker<N>,
    /// Held across a membership check and the queue update that depends on
    /// it, so a repaint never lands after its node's detach.
    membership: Mutex<()>,
    frame: u64,
    shut_down: bool,
}

impl<B: SurfaceBackend, N: TrackedNode> FrameHost<B, N> {
    pub fn new(backend: B, settings: HostSettings) -> Self {
        let disposer = Arc::new(FrameDisposer::new(settings.disposal));
        let dispose_manager: Arc<dyn DisposeManager<B::Surface>> = disposer.clone();
        let surfaces = Arc::new(SurfaceCacheManager::with_config(
            backend,
            dispose_manager,
            settings.cache,
        ));

        Self {
            settings,
            surfaces,
            disposer,
            invalidations: Arc::new(InvalidationQueue::new()),
            nodes: ControlsTracker::new(),
            membership: Mutex::new(()),
            frame: 0,
            shut_down: false,
        }
    }

    pub fn settings(&self) -> HostSettings {
        self.settings
    }

    /// Shared surface cache, for nodes painting on any thread.
    pub fn surfaces(&self) -> &Arc<SurfaceCacheManager<B>> {
        &self.surfaces
    }

    /// Shared invalidation queue, for producers outside the host thread.
    /// Enqueuing here directly skips the attached-node check.
    pub fn invalidations(&self) -> &Arc<InvalidationQueue> {
        &self.invalidations
    }

    pub fn disposer(&self) -> &Arc<FrameDisposer<B::Surface>> {
        &self.disposer
    }

    pub fn nodes(&self) -> &ControlsTracker<N> {
        &self.nodes
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn attach(&self, node: N) {
        log::trace!("attach node {}", node.node_id());
        self.nodes.add(node);
    }

    /// Detaches `node` and cancels its pending repaint.
    pub fn detach(&self, node: &N) -> bool {
        let node_id = node.node_id();
        let removed = {
            let _membership = lock(&self.membership);
            let removed = self.nodes.remove(node);
            self.invalidations.try_remove(&node_id);
            removed
        };
        log::trace!("detach node {node_id}: {removed}");
        removed
    }

    /// Schedules `repaint` for the next frame, replacing any repaint still
    /// pending for the same node. Requests for detached nodes are dropped.
    pub fn request_repaint(&self, node_id: NodeId, repaint: impl FnOnce() + Send + 'static) -> bool {
        let _membership = lock(&self.membership);
        if !self.nodes.contains(node_id) {
            log::debug!("ignoring repaint for detached node {node_id}");
            return false;
        }
        self.invalidations.enqueue(node_id, repaint);
        true
    }

    /// Runs every pending repaint once, then advances the disposer by one
    /// presented frame.
    pub fn process_frame(&mut self) -> FrameStats {
        let started = Instant::now();
        self.frame += 1;

        let actions_run = self.invalidations.execute_all();
        let surfaces_released = self.disposer.advance_frame();

        let stats = FrameStats {
            frame: self.frame,
            actions_run,
            surfaces_released,
            surfaces_pending: self.disposer.pending_count(),
            attached_nodes: self.nodes.count(),
        };
        log::trace!(
            "frame {} took {:?}: {stats:?}",
            self.frame,
            started.elapsed()
        );
        stats
    }

    /// Drops pending work, tears down the surface cache and releases every
    /// retired surface. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        let released = self.release_resources();
        self.nodes.clear();
        log::debug!(
            "frame host shut down after {} frames, released {released} surfaces",
            self.frame
        );
    }
}

impl<B: SurfaceBackend, N> FrameHost<B, N> {
    fn release_resources(&self) -> usize {
        self.invalidations.clear();
        self.surfaces.dispose();
        self.disposer.flush()
    }
}

impl<B: SurfaceBackend, N> Drop for FrameHost<B, N> {
    fn drop(&mut self) {
        if !self.shut_down {
            self.release_resources();
        }
    }
}

#[cfg(test)]
#[path = "tests/frame_host_tests.rs"]
mod tests;
