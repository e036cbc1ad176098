//=========================================================================
// Scene Runtime
//
// Entry point bundling a cooperative scheduler with a scene host.
//
// Architecture:
// ```text
//     SceneRuntimeBuilder ──build()──> SceneRuntime ──run_until_idle()──> [idle]
//         │                              │
//         ├─ with_environment()          ├─ scene(asset) → SceneController
//         ├─ with_load_latency()         └─ tick() → Scheduler::tick()
//         ├─ with_intake_limit()
//         ├─ with_tps()
//         └─ with_host()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;
use std::time::Duration;

use log::info;

//=== Internal Dependencies ===============================================

use crate::core::asset::AssetHandle;
use crate::core::host::{HeadlessHost, HostEnvironment, SceneHost};
use crate::core::scene::SceneController;
use crate::core::scheduler::{Dispatcher, Scheduler, SchedulerError, DEFAULT_INTAKE_LIMIT};

//=== SceneRuntimeBuilder =================================================

/// Builder for configuring and constructing a [`SceneRuntime`].
///
/// # Default Values
///
/// - **Environment**: `Runtime` (asynchronous host loads)
/// - **Load / unload latency**: 1 pending poll each
/// - **Intake limit**: 64 new tasks per tick
/// - **Max ticks**: 10 000 per `run_until_idle`
/// - **TPS**: unpaced
///
/// # Examples
///
/// ```
/// use aetheric_scene::prelude::*;
///
/// let mut runtime = SceneRuntimeBuilder::new()
///     .with_environment(HostEnvironment::Editor)
///     .build();
///
/// let scene = runtime.scene(Asset::loaded("scenes/hub"));
/// scene.load_additive();
/// runtime.run_until_idle().unwrap();
///
/// assert!(scene.is_loaded());
/// ```
pub struct SceneRuntimeBuilder {
    environment: HostEnvironment,
    load_latency: u32,
    unload_latency: u32,
    intake_limit: usize,
    max_ticks: u64,
    tps: Option<f64>,
    host: Option<Rc<dyn SceneHost>>,
}

impl SceneRuntimeBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            environment: HostEnvironment::Runtime,
            load_latency: 1,
            unload_latency: 1,
            intake_limit: DEFAULT_INTAKE_LIMIT,
            max_ticks: 10_000,
            tps: None,
            host: None,
        }
    }

    /// Selects which host environment the built-in headless host emulates.
    ///
    /// Ignored when a custom host is supplied with [`Self::with_host`].
    pub fn with_environment(mut self, environment: HostEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Pending polls before a headless runtime load completes.
    pub fn with_load_latency(mut self, polls: u32) -> Self {
        self.load_latency = polls;
        self
    }

    /// Pending polls before a headless unload completes.
    pub fn with_unload_latency(mut self, polls: u32) -> Self {
        self.unload_latency = polls;
        self
    }

    /// Maximum number of newly dispatched sequences started per tick.
    ///
    /// # Panics
    ///
    /// Panics if `limit == 0`.
    pub fn with_intake_limit(mut self, limit: usize) -> Self {
        assert!(limit > 0, "Intake limit must be positive");
        self.intake_limit = limit;
        self
    }

    /// Tick budget for a single `run_until_idle` call.
    ///
    /// # Panics
    ///
    /// Panics if `ticks == 0`.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        assert!(ticks > 0, "Max ticks must be positive");
        self.max_ticks = ticks;
        self
    }

    /// Paces `run_until_idle` at a fixed tick rate.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = Some(tps);
        self
    }

    /// Uses a caller-provided host instead of the headless one.
    pub fn with_host(mut self, host: Rc<dyn SceneHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> SceneRuntime {
        let (host, headless): (Rc<dyn SceneHost>, Option<HeadlessHost>) = match self.host {
            Some(host) => (host, None),
            None => {
                let headless = HeadlessHost::new(self.environment)
                    .with_load_latency(self.load_latency)
                    .with_unload_latency(self.unload_latency);
                (Rc::new(headless.clone()), Some(headless))
            }
        };

        info!(
            "Building scene runtime (environment: {:?}, custom host: {}, intake: {}, tps: {:?})",
            self.environment,
            headless.is_none(),
            self.intake_limit,
            self.tps
        );

        SceneRuntime {
            scheduler: Scheduler::with_intake_limit(self.intake_limit),
            host,
            headless,
            max_ticks: self.max_ticks,
            tps: self.tps,
        }
    }
}

impl Default for SceneRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== SceneRuntime ========================================================

/// A scheduler and a host, ready to drive scene controllers.
pub struct SceneRuntime {
    scheduler: Scheduler,
    host: Rc<dyn SceneHost>,
    headless: Option<HeadlessHost>,
    max_ticks: u64,
    tps: Option<f64>,
}

impl SceneRuntime {
    //--- Scenes -----------------------------------------------------------

    /// Creates a controller bound to `asset`, sharing this runtime's host
    /// and scheduler.
    pub fn scene(&self, asset: impl AssetHandle + 'static) -> SceneController {
        SceneController::new(asset, Rc::clone(&self.host), self.scheduler.dispatcher())
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.scheduler.dispatcher()
    }

    pub fn host(&self) -> Rc<dyn SceneHost> {
        Rc::clone(&self.host)
    }

    /// The built-in host, unless a custom one was supplied.
    pub fn headless_host(&self) -> Option<&HeadlessHost> {
        self.headless.as_ref()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    //--- Execution --------------------------------------------------------

    /// Runs one scheduler tick. Returns the number of sequences still running.
    pub fn tick(&mut self) -> usize {
        self.scheduler.tick()
    }

    /// Ticks until every dispatched sequence has finished.
    ///
    /// With a TPS configured, each tick is padded to the fixed frame
    /// duration. Returns the number of ticks taken.
    pub fn run_until_idle(&mut self) -> Result<u64, SchedulerError> {
        let frame_duration = self.tps.map(|tps| Duration::from_secs_f64(1.0 / tps));
        self.scheduler.run_until_idle_paced(self.max_ticks, frame_duration)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
