//=========================================================================
// Host Scene Loading
//=========================================================================
//
// Contract between the scene controller and the environment that
// actually loads scene content.
//
// This module defines the interface only, so host backends can be
// swapped without touching controller logic. Two execution
// environments are recognised:
//
//   Editor  : load is synchronous, returns a live scene handle
//   Runtime : load returns a pollable operation
//
// Components:
// - `headless`: in-process host emulating either environment
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Module Declarations =================================================

pub mod headless;

//=== Public API ==========================================================

pub use headless::{HeadlessHost, HostRequest};

//=== LoadSceneMode =======================================================

/// Whether a loaded scene replaces all resident scenes or layers on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadSceneMode {
    /// Unloads every resident scene first.
    #[default]
    Single,

    /// Adds the scene alongside the resident ones.
    Additive,
}

//=== HostEnvironment =====================================================

/// Host execution environment, chosen at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HostEnvironment {
    /// Authoring environment: in-place synchronous loads.
    Editor,

    /// Shipping environment: asynchronous loads.
    #[default]
    Runtime,
}

//=== HostSceneRef ========================================================

/// Opaque handle to a scene instance resident in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostSceneRef(u64);

impl HostSceneRef {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HostSceneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene#{}", self.0)
    }
}

//=== UnloadTarget ========================================================

/// What to unload: a live handle when the load produced one, otherwise
/// the path the scene was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnloadTarget {
    Path(String),
    Scene(HostSceneRef),
}

impl fmt::Display for UnloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "'{}'", path),
            Self::Scene(scene) => write!(f, "{}", scene),
        }
    }
}

//=== HostError ===========================================================

/// Failures reported by a host while loading or unloading scenes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The host could not load the scene at `path`.
    #[error("failed to load scene '{path}': {reason}")]
    LoadFailed { path: String, reason: String },

    /// The host could not unload `target`.
    #[error("failed to unload scene {target}: {reason}")]
    UnloadFailed { target: UnloadTarget, reason: String },

    /// The unload target is not resident in the host.
    #[error("scene {target} is not resident")]
    NotResident { target: UnloadTarget },
}

//=== HostOperation =======================================================

/// Progress of a host operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Pending,
    Complete,
}

/// An in-flight host load or unload, polled once per scheduler tick.
pub trait HostOperation {
    /// Advances the operation. Once it returns `Complete` or an error it
    /// must not be polled again.
    fn poll(&mut self) -> Result<OperationStatus, HostError>;
}

/// Result of asking the host to start a scene load.
pub enum BeginLoad {
    /// Runtime-style load: await the operation.
    Pending(Box<dyn HostOperation>),

    /// Editor-style load: the scene is already resident.
    Resident(HostSceneRef),
}

impl fmt::Debug for BeginLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(_) => f.write_str("Pending(..)"),
            Self::Resident(scene) => f.debug_tuple("Resident").field(scene).finish(),
        }
    }
}

//=== SceneHost Trait =====================================================

/// Host scene-loading primitives consumed by the scene controller.
///
/// Methods take `&self`; hosts are shared between controllers and the
/// sequences they dispatch, so any bookkeeping uses interior mutability.
pub trait SceneHost {
    /// Starts loading the scene stored at `path`.
    fn begin_load(&self, path: &str, mode: LoadSceneMode) -> Result<BeginLoad, HostError>;

    /// Starts unloading a resident scene.
    fn begin_unload(&self, target: &UnloadTarget) -> Result<Box<dyn HostOperation>, HostError>;
}

//=========================================================================
// Tests
//=========================================================================
