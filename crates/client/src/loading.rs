//! Reference-counted loading overlay.
//!
//! Every remote call holds a [`LoadingGuard`] for its whole lifetime. The
//! overlay is presented when the first guard is taken and dismissed when the
//! last one is dropped, so overlapping calls never hide it early and every
//! acquisition is released exactly once.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

/// Something that can show and hide a modal loading indicator.
pub trait LoadingView: Send + Sync {
    fn present(&self);
    fn dismiss(&self);
}

/// A view that only logs transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLoadingView;

impl LoadingView for TracingLoadingView {
    fn present(&self) {
        debug!("loading overlay shown");
    }

    fn dismiss(&self) {
        debug!("loading overlay hidden");
    }
}

struct LoadingInner {
    depth: Mutex<usize>,
    view: Arc<dyn LoadingView>,
}

/// Shared handle to the loading overlay.
#[derive(Clone)]
pub struct Loading {
    inner: Arc<LoadingInner>,
}

impl std::fmt::Debug for Loading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loading")
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}

impl Default for Loading {
    fn default() -> Self {
        Self::new(Arc::new(TracingLoadingView))
    }
}

impl Loading {
    #[must_use]
    pub fn new(view: Arc<dyn LoadingView>) -> Self {
        Self {
            inner: Arc::new(LoadingInner {
                depth: Mutex::new(0),
                view,
            }),
        }
    }

    /// Take a hold on the overlay, presenting it if nobody else holds it.
    #[must_use = "the overlay is released as soon as the guard is dropped"]
    pub fn acquire(&self) -> LoadingGuard {
        let mut depth = self
            .inner
            .depth
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *depth == 0 {
            self.inner.view.present();
        }
        *depth += 1;
        LoadingGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of outstanding guards.
    #[must_use]
    pub fn depth(&self) -> usize {
        *self
            .inner
            .depth
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.depth() > 0
    }
}

/// Releases its hold on the overlay when dropped.
pub struct LoadingGuard {
    inner: Arc<LoadingInner>,
}

impl std::fmt::Debug for LoadingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingGuard").finish_non_exhaustive()
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut depth = self
            .inner
            .depth
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *depth = depth.saturating_sub(1);
        if *depth == 0 {
            self.inner.view.dismiss();
        }
    }
}
