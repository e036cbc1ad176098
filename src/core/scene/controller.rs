//=========================================================================
// Scene Controller
//=========================================================================
//
// Owns one scene's load/unload state machine.
//
// The controller is a cheap clonable handle to shared state. Completion
// callbacks receive a handle and may call back into any public method,
// so no `RefCell` borrow is ever held while user code, the host or the
// scheduler runs.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use super::sequence::{LoadSequence, UnloadSequence};
use super::SceneState;
use crate::core::asset::{AssetCallback, AssetHandle};
use crate::core::event::{ListenerId, Listeners};
use crate::core::host::{HostError, HostSceneRef, LoadSceneMode, SceneHost, UnloadTarget};
use crate::core::scheduler::{Dispatcher, Task};

//=== Types ===============================================================

/// Observer notified once when the scene reaches `Loaded`.
pub type CompletionCallback = Box<dyn FnOnce(&SceneController)>;

/// What a load sequence should do once the host load has finished.
pub(super) enum LoadOutcome {
    /// Transitioned to `Loaded` and notified observers.
    Loaded,

    /// An unload arrived mid-load; the scene must be released again.
    UnloadRequested(UnloadTarget),

    /// The controller is no longer waiting on this load.
    Abandoned,
}

//=== SceneInner ==========================================================

struct SceneInner {
    state: SceneState,
    mode: LoadSceneMode,
    asset: Rc<dyn AssetHandle>,
    asset_subscription: Option<ListenerId>,
    pending: Listeners<CompletionCallback>,
    host_scene: Option<HostSceneRef>,
    load_dispatched: bool,
    last_error: Option<HostError>,
    host: Rc<dyn SceneHost>,
    dispatcher: Dispatcher,
}

impl SceneInner {
    fn reset_to_ready(&mut self) {
        self.state = SceneState::Ready;
        self.host_scene = None;
        self.load_dispatched = false;
    }
}

impl Drop for SceneInner {
    fn drop(&mut self) {
        if let Some(id) = self.asset_subscription.take() {
            self.asset.unsubscribe_completed(id);
        }
    }
}

//=== SceneController =====================================================

/// Loads and unloads one scene once its backing asset is ready.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use aetheric_scene::prelude::*;
///
/// let mut scheduler = Scheduler::new();
/// let host = HeadlessHost::new(HostEnvironment::Runtime);
/// let asset = Asset::new("scenes/arena");
///
/// let scene = SceneController::new(asset.clone(), Rc::new(host.clone()), scheduler.dispatcher());
/// scene.load().on_completed(|scene| assert!(scene.is_loaded()));
///
/// asset.complete();
/// scheduler.run_until_idle(16).unwrap();
///
/// assert_eq!(scene.state(), SceneState::Loaded);
/// assert!(host.is_resident("scenes/arena"));
/// ```
#[derive(Clone)]
pub struct SceneController {
    inner: Rc<RefCell<SceneInner>>,
}

impl SceneController {
    //--- Construction -----------------------------------------------------

    /// Binds a controller to `asset` for its whole lifetime.
    ///
    /// Sequences are dispatched through `dispatcher` and talk to `host`.
    pub fn new(
        asset: impl AssetHandle + 'static,
        host: Rc<dyn SceneHost>,
        dispatcher: Dispatcher,
    ) -> Self {
        let asset: Rc<dyn AssetHandle> = Rc::new(asset);
        let inner = Rc::new(RefCell::new(SceneInner {
            state: SceneState::Ready,
            mode: LoadSceneMode::Single,
            asset: Rc::clone(&asset),
            asset_subscription: None,
            pending: Listeners::new(),
            host_scene: None,
            load_dispatched: false,
            last_error: None,
            host,
            dispatcher,
        }));

        let weak: Weak<RefCell<SceneInner>> = Rc::downgrade(&inner);
        let on_asset: AssetCallback = Rc::new(move |_: &dyn AssetHandle| {
            if let Some(inner) = weak.upgrade() {
                SceneController { inner }.evaluate_asset_gate();
            }
        });
        let subscription = asset.subscribe_completed(on_asset);
        inner.borrow_mut().asset_subscription = Some(subscription);

        Self { inner }
    }

    //--- Public API -------------------------------------------------------

    /// Loads the scene, replacing every resident scene.
    ///
    /// Ignored unless the controller is `Ready`.
    pub fn load(&self) -> &Self {
        self.request_load(LoadSceneMode::Single)
    }

    /// Loads the scene alongside the resident ones.
    ///
    /// Ignored unless the controller is `Ready`.
    pub fn load_additive(&self) -> &Self {
        self.request_load(LoadSceneMode::Additive)
    }

    /// Requests the scene be unloaded.
    ///
    /// From `Loaded` this dispatches an unload. From `Loading` it never
    /// cancels the host: if the load is already in flight the controller
    /// moves to `Unloading` and the load sequence releases the scene as
    /// soon as it lands; otherwise it falls straight back to `Ready`.
    pub fn unload_scene(&self) {
        let dispatch = {
            let mut inner = self.inner.borrow_mut();
            let state = inner.state;
            match state {
                SceneState::Loaded => {
                    inner.state = SceneState::Unloading;
                    debug!("'{}': Loaded -> Unloading", inner.asset.asset_path());
                    true
                }
                SceneState::Loading => {
                    if inner.load_dispatched && inner.asset.is_loaded() {
                        inner.state = SceneState::Unloading;
                        debug!(
                            "'{}': Loading -> Unloading, release deferred until the load lands",
                            inner.asset.asset_path()
                        );
                    } else {
                        inner.reset_to_ready();
                        debug!(
                            "'{}': Loading -> Ready, load aborted before reaching the host",
                            inner.asset.asset_path()
                        );
                    }
                    false
                }
                SceneState::Ready | SceneState::Unloading => {
                    debug!("'{}': unload ignored while {:?}", inner.asset.asset_path(), state);
                    false
                }
            }
        };

        if dispatch {
            self.dispatch(Box::new(UnloadSequence::new(self.clone())));
        }
    }

    /// Registers a completion observer.
    ///
    /// If the scene is already `Loaded` the callback runs before this
    /// returns and is never queued. Otherwise it is queued and fires once,
    /// in registration order, when the scene next becomes `Loaded`.
    pub fn on_completed<F>(&self, callback: F) -> ListenerId
    where
        F: FnOnce(&SceneController) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        if inner.state == SceneState::Loaded {
            let id = inner.pending.reserve_id();
            drop(inner);
            callback(self);
            id
        } else {
            inner.pending.push(Box::new(callback))
        }
    }

    /// Removes a queued completion observer.
    ///
    /// Returns false if it already fired or was never queued.
    pub fn remove_completed(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().pending.remove(id)
    }

    //--- Query API --------------------------------------------------------

    pub fn state(&self) -> SceneState {
        self.inner.borrow().state
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == SceneState::Loaded
    }

    /// Mode of the current load episode, `None` while `Ready`.
    pub fn mode(&self) -> Option<LoadSceneMode> {
        let inner = self.inner.borrow();
        inner.state.has_mode().then_some(inner.mode)
    }

    /// Live host handle, when the host returned one.
    pub fn host_scene(&self) -> Option<HostSceneRef> {
        self.inner.borrow().host_scene
    }

    pub fn asset_path(&self) -> String {
        self.inner.borrow().asset.asset_path().to_string()
    }

    /// Number of observers waiting for `Loaded`.
    pub fn pending_callbacks(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Most recent host failure. Cleared by the next load request.
    pub fn last_error(&self) -> Option<HostError> {
        self.inner.borrow().last_error.clone()
    }

    //--- Sequence Hooks ---------------------------------------------------

    pub(super) fn host(&self) -> Rc<dyn SceneHost> {
        Rc::clone(&self.inner.borrow().host)
    }

    /// Path and mode for the host load, read when the load is issued.
    pub(super) fn load_request(&self) -> (String, LoadSceneMode) {
        let inner = self.inner.borrow();
        (inner.asset.asset_path().to_string(), inner.mode)
    }

    pub(super) fn mark_resident(&self, scene: HostSceneRef) {
        self.inner.borrow_mut().host_scene = Some(scene);
    }

    pub(super) fn unload_target(&self) -> UnloadTarget {
        let inner = self.inner.borrow();
        match inner.host_scene {
            Some(scene) => UnloadTarget::Scene(scene),
            None => UnloadTarget::Path(inner.asset.asset_path().to_string()),
        }
    }

    /// Settles a finished host load against the current state.
    pub(super) fn complete_load(&self) -> LoadOutcome {
        let cutoff = {
            let mut inner = self.inner.borrow_mut();
            let state = inner.state;
            match state {
                SceneState::Loading => {
                    inner.state = SceneState::Loaded;
                    inner.load_dispatched = false;
                    debug!(
                        "'{}': Loading -> Loaded, notifying {} observers",
                        inner.asset.asset_path(),
                        inner.pending.len()
                    );
                    inner.pending.next_id()
                }
                SceneState::Unloading => {
                    warn!(
                        "Scene '{}' finished loading after an unload was requested; releasing it",
                        inner.asset.asset_path()
                    );
                    drop(inner);
                    return LoadOutcome::UnloadRequested(self.unload_target());
                }
                _ => {
                    debug!(
                        "'{}': load finished while {:?}, ignoring",
                        inner.asset.asset_path(),
                        state
                    );
                    return LoadOutcome::Abandoned;
                }
            }
        };

        // Only observers queued before the transition belong to this load.
        loop {
            let next = self.inner.borrow_mut().pending.pop_front_before(cutoff);
            match next {
                Some(callback) => callback(self),
                None => break,
            }
        }

        LoadOutcome::Loaded
    }

    pub(super) fn fail_load(&self, err: HostError) {
        let mut inner = self.inner.borrow_mut();
        error!("Scene '{}' failed to load: {}", inner.asset.asset_path(), err);
        inner.reset_to_ready();
        inner.last_error = Some(err);
    }

    /// Ends an unload. Always returns the controller to `Ready`.
    pub(super) fn finish_unload(&self, result: Result<(), HostError>) {
        let mut inner = self.inner.borrow_mut();
        match result {
            Ok(()) => debug!("'{}': Unloading -> Ready", inner.asset.asset_path()),
            Err(err) => {
                error!("Scene '{}' failed to unload: {}", inner.asset.asset_path(), err);
                inner.last_error = Some(err);
            }
        }
        inner.reset_to_ready();
    }

    //--- Internal Helpers -------------------------------------------------

    fn request_load(&self, mode: LoadSceneMode) -> &Self {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state != SceneState::Ready {
                debug!(
                    "'{}': load ignored while {:?}",
                    inner.asset.asset_path(),
                    inner.state
                );
                return self;
            }

            inner.state = SceneState::Loading;
            inner.mode = mode;
            inner.load_dispatched = false;
            inner.last_error = None;
            debug!("'{}': Ready -> Loading ({:?})", inner.asset.asset_path(), mode);
        }

        self.evaluate_asset_gate();
        self
    }

    /// Dispatches the load sequence once per `Loading` episode, as soon as
    /// the asset reports itself loaded. Safe to call any number of times.
    fn evaluate_asset_gate(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state != SceneState::Loading
                || inner.load_dispatched
                || !inner.asset.is_loaded()
            {
                return;
            }
            inner.load_dispatched = true;
        }

        self.dispatch(Box::new(LoadSequence::new(self.clone())));
    }

    fn dispatch(&self, task: Box<dyn Task>) {
        let dispatcher = self.inner.borrow().dispatcher.clone();
        if let Err(err) = dispatcher.dispatch(task) {
            let mut inner = self.inner.borrow_mut();
            error!("Scene '{}' could not be scheduled: {}", inner.asset.asset_path(), err);
            inner.reset_to_ready();
        }
    }
}

impl fmt::Debug for SceneController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SceneController")
            .field("asset", &inner.asset.asset_path())
            .field("state", &inner.state)
            .field("mode", &inner.mode)
            .field("host_scene", &inner.host_scene)
            .field("pending", &inner.pending.len())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::Asset;
    use crate::core::host::{HeadlessHost, HostEnvironment, HostRequest};
    use crate::core::scheduler::Scheduler;

    //--- Fixtures ---------------------------------------------------------

    struct Fixture {
        scheduler: Scheduler,
        host: HeadlessHost,
        asset: Asset,
        scene: SceneController,
    }

    impl Fixture {
        fn new(environment: HostEnvironment) -> Self {
            Self::with_asset(environment, Asset::new("scenes/level1"))
        }

        fn with_asset(environment: HostEnvironment, asset: Asset) -> Self {
            let scheduler = Scheduler::new();
            let host = HeadlessHost::new(environment);
            let scene =
                SceneController::new(asset.clone(), Rc::new(host.clone()), scheduler.dispatcher());
            Self {
                scheduler,
                host,
                asset,
                scene,
            }
        }

        fn settle(&mut self) {
            self.scheduler.run_until_idle(64).unwrap();
        }
    }

    fn recorder() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn observe(scene: &SceneController, log: &Rc<RefCell<Vec<String>>>, label: &str) -> ListenerId {
        let log = Rc::clone(log);
        let label = label.to_string();
        scene.on_completed(move |_| log.borrow_mut().push(label))
    }

    //--- State Machine ----------------------------------------------------

    #[test]
    fn new_controller_is_ready() {
        let fx = Fixture::new(HostEnvironment::Runtime);
        assert_eq!(fx.scene.state(), SceneState::Ready);
        assert_eq!(fx.scene.mode(), None);
        assert_eq!(fx.scene.asset_path(), "scenes/level1");
        assert_eq!(fx.asset.subscriber_count(), 1);
    }

    #[test]
    fn load_waits_for_asset_then_loads_single() {
        let mut fx = Fixture::new(HostEnvironment::Runtime);
        let log = recorder();
        observe(&fx.scene, &log, "a");

        fx.scene.load();
        assert_eq!(fx.scene.state(), SceneState::Loading);
        fx.settle();
        assert_eq!(fx.host.load_requests(), 0, "No host load before the asset is ready");

        fx.asset.complete();
        fx.scheduler.tick();
        assert_eq!(
            fx.host.requests(),
            vec![HostRequest::Load {
                path: "scenes/level1".into(),
                mode: LoadSceneMode::Single
            }]
        );
        assert_eq!(fx.scene.state(), SceneState::Loading);

        fx.settle();
        assert_eq!(fx.scene.state(), SceneState::Loaded);
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(fx.scene.pending_callbacks(), 0);
    }

    #[test]
    fn load_additive_passes_additive_mode() {
        let mut fx = Fixture::new(HostEnvironment::Runtime);

        fx.scene.load_additive();
        assert_eq!(fx.scene.mode(), Some(LoadSceneMode::Additive));
        fx.asset.complete();
        fx.settle();

        assert_eq!(
            fx.host.requests(),
            vec![HostRequest::Load {
                path: "scenes/level1".into(),
                mode: LoadSceneMode::Additive
            }]
        );
        assert!(fx.scene.is_loaded());
    }

    #[test]
    fn repeated_load_issues_one_host_request() {
        let mut fx = Fixture::with_asset(HostEnvironment::Runtime, Asset::loaded("scenes/level1"));

        fx.scene.load().load().load_additive();
        assert_eq!(fx.scene.mode(), Some(LoadSceneMode::Single));
        fx.settle();
        fx.scene.load();
        fx.settle();

        assert_eq!(fx.host.load_requests(), 1);
        assert!(fx.scene.is_loaded());
    }

    #[test]
    fn asset_notification_does_not_double_dispatch() {
        let mut fx = Fixture::with_asset(HostEnvironment::Runtime, Asset::loaded("scenes/level1"));

        fx.scene.load();
        // A second readiness signal while the load is in flight.
        fx.scene.evaluate_asset_gate();
        fx.settle();

        assert_eq!(fx.host.load_requests(), 1);
    }

    //--- Completion Fan-out -----------------------------------------------

    #[test]
    fn queued_observers_fire_once_in_order() {
        let mut fx = Fixture::new(HostEnvironment::Runtime);
        let log = recorder();
        for label in ["o1", "o2", "o3", "o4"] {
            observe(&fx.scene, &log, label);
        }

        fx.scene.load();
        fx.asset.complete();
        fx.settle();
        fx.scene.unload_scene();
        fx.settle();
        fx.scene.load();
        fx.settle();

        assert_eq!(*log.borrow(), vec!["o1", "o2", "o3", "o4"]);
    }

    #[test]
    fn late_observer_fires_synchronously() {
        let mut fx = Fixture::with_asset(HostEnvironment::Runtime, Asset::loaded("scenes/level1"));
        fx.scene.load();
        fx.settle();

        let log = recorder();
        observe(&fx.scene, &log, "late");

        assert_eq!(*log.borrow(), vec!["late"]);
        assert_eq!(fx.scene.pending_callbacks(), 0);
    }

    #[test]
    fn removed_observer_never_fires() {
        let mut fx = Fixture::new(HostEnvironment::Runtime);
        let log = recorder();
        let first = observe(&fx.scene, &log, "first");
        observe(&fx.scene, &log, "second");

        assert!(fx.scene.remove_completed(first));
        fx.scene.load();
        fx.asset.complete();
        fx.settle();

        assert_eq!(*log.borrow(), vec!["second"]);
        assert!(!fx.scene.remove_completed(first));
    }

    #[test]
    fn observer_registering_another_does_not_double_fire() {
        let mut fx = Fixture::new(HostEnvironment::Runtime);
        let log = recorder();

        let sink = Rc::clone(&log);
        fx.scene.on_completed(move |scene| {
            sink.borrow_mut().push("outer".to_string());
            let inner_sink = Rc::clone(&sink);
            scene.on_completed(move |_| inner_sink.borrow_mut().push("inner".to_string()));
        });
        observe(&fx.scene, &log, "after");

        fx.scene.load();
        fx.asset.complete();
        fx.settle();

        assert_eq!(*log.borrow(), vec!["outer", "inner", "after"]);
    }

    #[test]
    fn observer_may_remove_a_later_observer() {
        let mut fx = Fixture::new(HostEnvironment::Runtime);
        let log = recorder();

        let victim: Rc<RefCell<Option<ListenerId>>> = Rc::new(RefCell::new(None));
        let target = Rc::clone(&victim);
        fx.scene.on_completed(move |scene| {
            if let Some(id) = target.borrow_mut().take() {
                scene.remove_completed(id);
            }
        });
        *victim.borrow_mut() = Some(observe(&fx.scene, &log, "victim"));

        fx.scene.load();
        fx.asset.complete();
        fx.settle();

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn observer_queued_after_unload_in_drain_waits_for_next_load() {
        let mut fx = Fixture::new(HostEnvironment::Runtime);
        let log = recorder();

        let sink = Rc::clone(&log);
        fx.scene.on_completed(move |scene| {
            scene.unload_scene();
            let inner_sink = Rc::clone(&sink);
            scene.on_completed(move |_| inner_sink.borrow_mut().push("next".to_string()));
        });
        observe(&fx.scene, &log, "same-load");

        fx.scene.load();
        fx.asset.complete();
        fx.settle();

        assert_eq!(*log.borrow(), vec!["same-load"]);
        assert_eq!(fx.scene.state(), SceneState::Ready);
        assert_eq!(fx.scene.pending_callbacks(), 1);

        fx.scene.load();
        fx.settle();
        assert_eq!(*log.borrow(), vec!["same-load", "next"]);
    }

    //--- Unload Paths -----------------------------------------------------

    #[test]
    fn unload_from_loaded_issues_one_host_unload() {
        let mut fx = Fixture::with_asset(HostEnvironment::Runtime, Asset::loaded("scenes/level1"));
        fx.scene.load();
        fx.settle();

        fx.scene.unload_scene();
        assert_eq!(fx.scene.state(), SceneState::Unloading);
        fx.scene.unload_scene();
        fx.settle();

        assert_eq!(fx.scene.state(), SceneState::Ready);
        assert_eq!(fx.host.unload_requests(), 1);
        assert!(fx.host.resident_scenes().is_empty());
    }

    #[test]
    fn unload_before_asset_ready_aborts_without_host_load() {
        let mut fx = Fixture::new(HostEnvironment::Runtime);

        fx.scene.load();
        fx.scene.unload_scene();
        assert_eq!(fx.scene.state(), SceneState::Ready);

        fx.asset.complete();
        fx.settle();

        assert_eq!(fx.scene.state(), SceneState::Ready);
        assert!(fx.host.requests().is_empty());
    }

    #[test]
    fn unload_after_asset_ready_but_before_dispatch_aborts() {
        let mut scheduler = Scheduler::new();
        let host = HeadlessHost::new(HostEnvironment::Runtime);
        let asset = Asset::new("scenes/level1");

        // Subscribed ahead of the controller, so it runs while the asset
        // already reports loaded but the controller has not been notified.
        let slot: Rc<RefCell<Option<SceneController>>> = Rc::new(RefCell::new(None));
        let seen = Rc::new(RefCell::new(None));
        let (target, state_log) = (Rc::clone(&slot), Rc::clone(&seen));
        asset.subscribe_completed(Rc::new(move |_: &dyn AssetHandle| {
            if let Some(scene) = target.borrow().as_ref() {
                scene.unload_scene();
                *state_log.borrow_mut() = Some(scene.state());
            }
        }));

        let scene = SceneController::new(asset.clone(), Rc::new(host.clone()), scheduler.dispatcher());
        *slot.borrow_mut() = Some(scene.clone());

        scene.load();
        asset.complete();
        scheduler.run_until_idle(64).unwrap();

        assert_eq!(*seen.borrow(), Some(SceneState::Ready));
        assert_eq!(scene.state(), SceneState::Ready);
        assert_eq!(host.load_requests(), 0);
        assert_eq!(host.unload_requests(), 0);

        slot.borrow_mut().take();
    }

    #[test]
    fn unload_during_in_flight_load_loads_then_unloads() {
        let mut fx = Fixture::with_asset(HostEnvironment::Runtime, Asset::loaded("scenes/level1"));
        let log = recorder();
        observe(&fx.scene, &log, "waiter");

        fx.scene.load();
        fx.scheduler.tick();
        fx.scene.unload_scene();
        assert_eq!(fx.scene.state(), SceneState::Unloading);

        fx.settle();

        assert_eq!(fx.scene.state(), SceneState::Ready);
        assert_eq!(
            fx.host.requests(),
            vec![
                HostRequest::Load {
                    path: "scenes/level1".into(),
                    mode: LoadSceneMode::Single
                },
                HostRequest::Unload(UnloadTarget::Path("scenes/level1".into())),
            ]
        );
        assert!(fx.host.resident_scenes().is_empty());
        assert!(log.borrow().is_empty(), "Observers are not told about a released load");
        assert_eq!(fx.scene.pending_callbacks(), 1);

        fx.scene.load();
        fx.settle();

        assert!(fx.scene.is_loaded());
        assert_eq!(*log.borrow(), vec!["waiter"]);
        assert_eq!(fx.scene.pending_callbacks(), 0);
    }

    #[test]
    fn unload_before_sequence_starts_still_loads_then_unloads() {
        let mut fx = Fixture::with_asset(HostEnvironment::Runtime, Asset::loaded("scenes/level1"));

        fx.scene.load();
        fx.scene.unload_scene();
        fx.settle();

        assert_eq!(fx.scene.state(), SceneState::Ready);
        assert_eq!(fx.host.load_requests(), 1);
        assert_eq!(fx.host.unload_requests(), 1);
        assert!(fx.host.resident_scenes().is_empty());
    }

    #[test]
    fn unload_while_ready_is_noop() {
        let mut fx = Fixture::new(HostEnvironment::Runtime);
        fx.scene.unload_scene();
        fx.settle();

        assert_eq!(fx.scene.state(), SceneState::Ready);
        assert!(fx.host.requests().is_empty());
    }

    #[test]
    fn controller_is_reusable_across_cycles() {
        let mut fx = Fixture::with_asset(HostEnvironment::Runtime, Asset::loaded("scenes/level1"));

        for _ in 0..3 {
            fx.scene.load();
            fx.settle();
            assert!(fx.scene.is_loaded());
            fx.scene.unload_scene();
            fx.settle();
            assert_eq!(fx.scene.state(), SceneState::Ready);
        }

        assert_eq!(fx.host.load_requests(), 3);
        assert_eq!(fx.host.unload_requests(), 3);
    }

    //--- Editor Environment -----------------------------------------------

    #[test]
    fn editor_load_keeps_live_handle_and_unloads_by_it() {
        let mut fx = Fixture::with_asset(HostEnvironment::Editor, Asset::loaded("scenes/level1"));

        fx.scene.load_additive();
        fx.settle();
        let scene = fx.scene.host_scene().expect("Editor load should return a handle");
        assert!(fx.scene.is_loaded());

        fx.scene.unload_scene();
        fx.settle();

        assert_eq!(fx.scene.host_scene(), None);
        assert_eq!(
            fx.host.requests().last(),
            Some(&HostRequest::Unload(UnloadTarget::Scene(scene)))
        );
    }

    #[test]
    fn editor_race_correction_unloads_by_handle() {
        let mut fx = Fixture::with_asset(HostEnvironment::Editor, Asset::loaded("scenes/level1"));

        fx.scene.load();
        fx.scene.unload_scene();
        fx.settle();

        assert_eq!(fx.scene.state(), SceneState::Ready);
        assert!(matches!(
            fx.host.requests().last(),
            Some(HostRequest::Unload(UnloadTarget::Scene(_)))
        ));
        assert!(fx.host.resident_scenes().is_empty());
    }

    //--- Failures ---------------------------------------------------------

    #[test]
    fn failed_load_returns_to_ready_and_keeps_observers() {
        let mut fx = Fixture::with_asset(HostEnvironment::Runtime, Asset::loaded("scenes/level1"));
        fx.host.fail_loads_of("scenes/level1");
        let log = recorder();
        observe(&fx.scene, &log, "waiter");

        fx.scene.load();
        fx.settle();

        assert_eq!(fx.scene.state(), SceneState::Ready);
        assert!(matches!(fx.scene.last_error(), Some(HostError::LoadFailed { .. })));
        assert_eq!(fx.scene.pending_callbacks(), 1);
        assert!(log.borrow().is_empty());

        fx.host.allow_loads_of("scenes/level1");
        fx.scene.load();
        fx.settle();

        assert!(fx.scene.is_loaded());
        assert!(fx.scene.last_error().is_none());
        assert_eq!(*log.borrow(), vec!["waiter"]);
        assert_eq!(fx.scene.pending_callbacks(), 0);
    }

    #[test]
    fn failed_unload_still_returns_to_ready() {
        let mut fx = Fixture::with_asset(HostEnvironment::Runtime, Asset::loaded("scenes/level1"));
        fx.scene.load();
        fx.settle();

        // Another single-mode load evicts ours behind the controller's back.
        let other = SceneController::new(
            Asset::loaded("scenes/level2"),
            Rc::new(fx.host.clone()),
            fx.scheduler.dispatcher(),
        );
        other.load();
        fx.settle();

        fx.scene.unload_scene();
        fx.settle();

        assert_eq!(fx.scene.state(), SceneState::Ready);
        assert!(matches!(fx.scene.last_error(), Some(HostError::NotResident { .. })));
    }

    #[test]
    fn next_load_clears_last_error() {
        let mut fx = Fixture::with_asset(HostEnvironment::Editor, Asset::loaded("scenes/level1"));
        fx.host.fail_loads_of("scenes/level1");
        fx.scene.load();
        fx.settle();
        assert!(fx.scene.last_error().is_some());

        fx.scene.load();
        assert!(fx.scene.last_error().is_none());
    }

    #[test]
    fn dispatch_failure_returns_to_ready() {
        let asset = Asset::loaded("scenes/level1");
        let host = HeadlessHost::new(HostEnvironment::Runtime);
        let scheduler = Scheduler::new();
        let dispatcher = scheduler.dispatcher();
        drop(scheduler);

        let scene = SceneController::new(asset, Rc::new(host), dispatcher);
        scene.load();

        assert_eq!(scene.state(), SceneState::Ready);
    }

    //--- Lifetime ---------------------------------------------------------

    #[test]
    fn dropping_last_handle_unsubscribes_from_asset() {
        let fx = Fixture::new(HostEnvironment::Runtime);
        let asset = fx.asset.clone();
        assert_eq!(asset.subscriber_count(), 1);

        drop(fx);

        assert_eq!(asset.subscriber_count(), 0);
    }
}
