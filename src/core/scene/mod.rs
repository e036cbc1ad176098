//=========================================================================
// Scene System
//=========================================================================
//
// Per-scene load/unload state machine driven by a cooperative scheduler.
//
// Architecture:
//   SceneController
//     ├─ state: SceneState
//     ├─ asset: Rc<dyn AssetHandle>   (completion → readiness gate)
//     ├─ pending: Listeners<callback> (drained on Loaded)
//     └─ host: Rc<dyn SceneHost>
//
// Flow:
//   load() → Loading → asset ready → LoadSequence → Loaded → callbacks
//   unload_scene() → Unloading → UnloadSequence → Ready
//
//=========================================================================

//=== Module Declarations =================================================

mod controller;
mod sequence;

//=== Public API ==========================================================

pub use controller::{CompletionCallback, SceneController};

//=== SceneState ==========================================================

/// Lifecycle state of a scene controller.
///
/// ```text
///   Ready ──load()──> Loading ──host done──> Loaded
///     ^                  │                     │
///     │     unload_scene() (asset not ready)   │ unload_scene()
///     ├──────────────────┘                     v
///     └────────────── host done ────────── Unloading
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SceneState {
    /// Nothing loaded and nothing in flight.
    #[default]
    Ready,

    /// Waiting on the asset and/or the host load.
    Loading,

    /// The scene is resident in the host.
    Loaded,

    /// The scene is being torn down.
    Unloading,
}

impl SceneState {
    /// Whether a load mode is meaningful in this state.
    pub fn has_mode(self) -> bool {
        self != SceneState::Ready
    }
}

//=========================================================================
// Tests
//=========================================================================
