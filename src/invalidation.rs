//! View invalidation events.
//!
//! The task service reports each successful mutation here. Every view that
//! depends on the mutated data has a generation counter; bumping it tells
//! subscribers that whatever they rendered before is stale and the next render
//! must re-fetch. Invalidation is per view path, never per row.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Views whose content is derived from the task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewPath {
    /// The task list on the home page.
    TaskList,
}

impl ViewPath {
    pub const ALL: [ViewPath; 1] = [ViewPath::TaskList];

    /// URL path the view is served from.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewPath::TaskList => "/",
        }
    }
}

/// Categories of mutations reported by the task service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    TaskCreated,
    TaskUpdated,
    TaskToggled,
    TaskDeleted,
}

impl MutationKind {
    /// Views made stale by this kind of mutation.
    pub fn affected_views(&self) -> &'static [ViewPath] {
        match self {
            MutationKind::TaskCreated
            | MutationKind::TaskUpdated
            | MutationKind::TaskToggled
            | MutationKind::TaskDeleted => &[ViewPath::TaskList],
        }
    }
}

/// Publishes invalidation events. Cheap to clone; clones share the counters.
#[derive(Clone)]
pub struct Invalidator {
    views: Arc<HashMap<ViewPath, watch::Sender<u64>>>,
}

impl Invalidator {
    pub fn new() -> Self {
        let views = ViewPath::ALL
            .into_iter()
            .map(|view| (view, watch::Sender::new(0)))
            .collect();
        Self {
            views: Arc::new(views),
        }
    }

    /// Mark every view affected by `kind` as stale.
    pub fn invalidate(&self, kind: MutationKind) {
        for view in kind.affected_views() {
            if let Some(tx) = self.views.get(view) {
                tx.send_modify(|generation| *generation += 1);
                debug!(view = view.as_str(), mutation = ?kind, generation = *tx.borrow(), "View invalidated");
            }
        }
    }

    /// Current generation of a view.
    pub fn generation(&self, view: ViewPath) -> u64 {
        self.views.get(&view).map(|tx| *tx.borrow()).unwrap_or_default()
    }

    /// Subscribe to invalidations of a view.
    pub fn subscribe(&self, view: ViewPath) -> ViewSubscription {
        let rx = match self.views.get(&view) {
            Some(tx) => tx.subscribe(),
            // Every ViewPath is registered in new(); a detached receiver never changes.
            None => watch::channel(0).1,
        };
        ViewSubscription { view, rx }
    }
}

impl Default for Invalidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a view's invalidation events.
#[derive(Clone)]
pub struct ViewSubscription {
    view: ViewPath,
    rx: watch::Receiver<u64>,
}

impl ViewSubscription {
    pub fn view(&self) -> ViewPath {
        self.view
    }

    /// Latest generation published for the view.
    pub fn generation(&self) -> u64 {
        *self.rx.borrow()
    }

    /// Whether the view was invalidated since the last [`mark_seen`](Self::mark_seen).
    ///
    /// A closed channel reports `true` so the view always re-fetches.
    pub fn is_stale(&self) -> bool {
        self.rx.has_changed().unwrap_or(true)
    }

    /// Acknowledge the current generation and return it.
    pub fn mark_seen(&mut self) -> u64 {
        *self.rx.borrow_and_update()
    }

    /// Wait for the next invalidation. Returns `false` once the publisher is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
