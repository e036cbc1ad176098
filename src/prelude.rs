//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_scene::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Runtime facade
pub use crate::engine::{SceneRuntime, SceneRuntimeBuilder};

// Assets
pub use crate::core::asset::{Asset, AssetHandle};

// Host contract
pub use crate::core::host::{
    HeadlessHost, HostEnvironment, HostError, HostSceneRef, LoadSceneMode, SceneHost,
    UnloadTarget,
};

// Scheduler
pub use crate::core::scheduler::{Dispatcher, Scheduler, SchedulerError};

// Scene system
pub use crate::core::event::ListenerId;
pub use crate::core::scene::{SceneController, SceneState};
