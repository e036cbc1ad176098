//=========================================================================
// Core Systems
//
// Building blocks of the scene loading protocol.
//
// Responsibilities:
// - `event`: ordered listener lists backing every completion event
// - `asset`: asset handle contract and shared implementation
// - `host`: host scene-loading contract and the headless host
// - `scheduler`: cooperative task execution
// - `scene`: per-scene load/unload state machine
//
// Notes:
// Everything here runs on one logical thread. Shared state uses
// `Rc<RefCell<..>>` and borrows are never held across calls into user
// callbacks, the host or the scheduler, so re-entrant calls from a
// completion callback are safe.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod asset;
pub mod event;
pub mod host;
pub mod scene;
pub mod scheduler;

//=== Public API ==========================================================

pub use asset::{Asset, AssetCallback, AssetHandle};
pub use event::{ListenerId, Listeners};
pub use host::{
    BeginLoad, HeadlessHost, HostEnvironment, HostError, HostOperation, HostRequest, HostSceneRef,
    LoadSceneMode, OperationStatus, SceneHost, UnloadTarget,
};
pub use scene::{CompletionCallback, SceneController, SceneState};
pub use scheduler::{Dispatcher, Scheduler, SchedulerError, Task, TaskPoll};
