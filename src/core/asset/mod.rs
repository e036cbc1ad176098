//=========================================================================
// Asset Handles
//=========================================================================
//
// Contract for the raw content that backs a scene, plus a shared
// in-process implementation.
//
// Architecture:
//   Asset (Rc handle)
//     ├─ path: String
//     ├─ loaded: Cell<bool>
//     └─ listeners: RefCell<Listeners<AssetCallback>>
//
// Flow:
//   complete() → loaded = true → snapshot listeners → callback(&asset)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::event::{ListenerId, Listeners};

//=== AssetHandle Trait ===================================================

/// Callback fired when an asset finishes loading.
pub type AssetCallback = Rc<dyn Fn(&dyn AssetHandle)>;

/// Loading lifecycle of the content backing a scene.
///
/// The completion event may fire synchronously from inside
/// `subscribe_completed` (when the asset is already loaded) or later
/// from whatever drives the asset. Subscribers must cope with both.
pub trait AssetHandle {
    /// Whether the asset content is ready.
    fn is_loaded(&self) -> bool;

    /// Identifier handed opaquely to the host scene loader.
    fn asset_path(&self) -> &str;

    /// Registers a completion subscriber. Subscriptions persist until
    /// removed with [`AssetHandle::unsubscribe_completed`].
    fn subscribe_completed(&self, callback: AssetCallback) -> ListenerId;

    /// Removes a completion subscriber. Returns false if unknown.
    fn unsubscribe_completed(&self, id: ListenerId) -> bool;
}

//=== Asset ===============================================================

struct AssetInner {
    path: String,
    loaded: Cell<bool>,
    listeners: RefCell<Listeners<AssetCallback>>,
}

/// Shared, cheaply clonable asset handle.
///
/// Whatever fetches the asset bytes calls [`Asset::complete`] once they
/// are ready. Clones observe the same state.
#[derive(Clone)]
pub struct Asset {
    inner: Rc<AssetInner>,
}

impl Asset {
    /// Creates an asset that is not yet loaded.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(AssetInner {
                path: path.into(),
                loaded: Cell::new(false),
                listeners: RefCell::new(Listeners::new()),
            }),
        }
    }

    /// Creates an asset that is already loaded.
    pub fn loaded(path: impl Into<String>) -> Self {
        let asset = Self::new(path);
        asset.inner.loaded.set(true);
        asset
    }

    /// Marks the asset loaded and notifies subscribers.
    ///
    /// Returns false (and notifies nobody) if it was already loaded.
    pub fn complete(&self) -> bool {
        if self.inner.loaded.replace(true) {
            return false;
        }

        debug!("Asset '{}' completed", self.inner.path);
        self.notify();
        true
    }

    /// Number of registered completion subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    //--- Internal Helpers -------------------------------------------------

    fn notify(&self) {
        // Snapshot so subscribers may (un)subscribe while we iterate.
        let snapshot: Vec<(ListenerId, AssetCallback)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(id, callback)| (id, Rc::clone(callback)))
            .collect();

        for (id, callback) in snapshot {
            let still_registered = self.inner.listeners.borrow().contains(id);
            if still_registered {
                callback(self);
            }
        }
    }
}

impl AssetHandle for Asset {
    fn is_loaded(&self) -> bool {
        self.inner.loaded.get()
    }

    fn asset_path(&self) -> &str {
        &self.inner.path
    }

    fn subscribe_completed(&self, callback: AssetCallback) -> ListenerId {
        let id = self.inner.listeners.borrow_mut().push(Rc::clone(&callback));
        if self.is_loaded() {
            callback(self);
        }
        id
    }

    fn unsubscribe_completed(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow_mut().remove(id)
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("path", &self.inner.path)
            .field("loaded", &self.inner.loaded.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
