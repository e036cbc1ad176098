//=========================================================================
// Headless Host
//=========================================================================
//
// In-process scene host with no rendering backend.
//
// Emulates the timing of either host environment:
//   Editor  → begin_load() commits immediately, returns Resident
//   Runtime → begin_load() returns an operation that commits after
//             `load_latency` pending polls
//
// Unloads always go through an operation. Every request is logged so
// callers can inspect exactly what the host was asked to do.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use log::debug;

//=== Internal Dependencies ===============================================

use super::{
    BeginLoad, HostEnvironment, HostError, HostOperation, HostSceneRef, LoadSceneMode,
    OperationStatus, SceneHost, UnloadTarget,
};

//=== HostRequest =========================================================

/// A request received by the headless host, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    Load { path: String, mode: LoadSceneMode },
    Unload(UnloadTarget),
}

//=== Host State ==========================================================

#[derive(Default)]
struct HostState {
    next_scene: u64,
    resident: Vec<(HostSceneRef, String)>,
    requests: Vec<HostRequest>,
    failing: HashSet<String>,
}

impl HostState {
    fn commit_load(&mut self, path: &str, mode: LoadSceneMode) -> HostSceneRef {
        if mode == LoadSceneMode::Single {
            self.resident.clear();
        }

        let scene = HostSceneRef::new(self.next_scene);
        self.next_scene += 1;
        self.resident.push((scene, path.to_string()));
        debug!("Host committed {} from '{}' ({:?})", scene, path, mode);
        scene
    }

    fn resident_index(&self, target: &UnloadTarget) -> Option<usize> {
        self.resident.iter().position(|(scene, path)| match target {
            UnloadTarget::Path(wanted) => path == wanted,
            UnloadTarget::Scene(wanted) => scene == wanted,
        })
    }
}

//=== HeadlessOperation ===================================================

type Commit = Box<dyn FnOnce() -> Result<(), HostError>>;

/// Operation that stays pending for a fixed number of polls, then runs
/// its commit step.
struct HeadlessOperation {
    remaining: u32,
    commit: Option<Commit>,
}

impl HostOperation for HeadlessOperation {
    fn poll(&mut self) -> Result<OperationStatus, HostError> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(OperationStatus::Pending);
        }

        match self.commit.take() {
            Some(commit) => commit().map(|()| OperationStatus::Complete),
            None => Ok(OperationStatus::Complete),
        }
    }
}

//=== HeadlessHost ========================================================

/// Scene host that keeps resident scenes in memory.
///
/// Cloning yields another handle to the same host, so tests can keep a
/// handle for inspection while controllers own theirs.
#[derive(Clone)]
pub struct HeadlessHost {
    environment: HostEnvironment,
    load_latency: u32,
    unload_latency: u32,
    state: Rc<RefCell<HostState>>,
}

impl HeadlessHost {
    //--- Construction -----------------------------------------------------

    /// Creates a host emulating `environment`, with one pending poll per
    /// asynchronous operation.
    pub fn new(environment: HostEnvironment) -> Self {
        Self {
            environment,
            load_latency: 1,
            unload_latency: 1,
            state: Rc::new(RefCell::new(HostState::default())),
        }
    }

    /// Number of pending polls before a runtime load completes.
    pub fn with_load_latency(mut self, polls: u32) -> Self {
        self.load_latency = polls;
        self
    }

    /// Number of pending polls before an unload completes.
    pub fn with_unload_latency(mut self, polls: u32) -> Self {
        self.unload_latency = polls;
        self
    }

    /// Makes every later load of `path` fail.
    pub fn fail_loads_of(&self, path: impl Into<String>) {
        self.state.borrow_mut().failing.insert(path.into());
    }

    /// Lets loads of `path` succeed again.
    pub fn allow_loads_of(&self, path: &str) {
        self.state.borrow_mut().failing.remove(path);
    }

    //--- Query API --------------------------------------------------------

    pub fn environment(&self) -> HostEnvironment {
        self.environment
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<HostRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn load_requests(&self) -> usize {
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|r| matches!(r, HostRequest::Load { .. }))
            .count()
    }

    pub fn unload_requests(&self) -> usize {
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|r| matches!(r, HostRequest::Unload(_)))
            .count()
    }

    /// Paths of resident scenes, oldest first.
    pub fn resident_scenes(&self) -> Vec<String> {
        self.state
            .borrow()
            .resident
            .iter()
            .map(|(_, path)| path.clone())
            .collect()
    }

    pub fn is_resident(&self, path: &str) -> bool {
        self.state.borrow().resident.iter().any(|(_, p)| p == path)
    }

    //--- Internal Helpers -------------------------------------------------

    fn load_failure(path: &str) -> HostError {
        HostError::LoadFailed {
            path: path.to_string(),
            reason: "host refused the scene".to_string(),
        }
    }
}

impl SceneHost for HeadlessHost {
    fn begin_load(&self, path: &str, mode: LoadSceneMode) -> Result<BeginLoad, HostError> {
        let failing = {
            let mut state = self.state.borrow_mut();
            state.requests.push(HostRequest::Load {
                path: path.to_string(),
                mode,
            });
            state.failing.contains(path)
        };

        match self.environment {
            HostEnvironment::Editor => {
                if failing {
                    return Err(Self::load_failure(path));
                }
                let scene = self.state.borrow_mut().commit_load(path, mode);
                Ok(BeginLoad::Resident(scene))
            }
            HostEnvironment::Runtime => {
                let state = Rc::clone(&self.state);
                let path = path.to_string();
                let commit: Commit = Box::new(move || {
                    if failing {
                        return Err(Self::load_failure(&path));
                    }
                    state.borrow_mut().commit_load(&path, mode);
                    Ok(())
                });
                Ok(BeginLoad::Pending(Box::new(HeadlessOperation {
                    remaining: self.load_latency,
                    commit: Some(commit),
                })))
            }
        }
    }

    fn begin_unload(&self, target: &UnloadTarget) -> Result<Box<dyn HostOperation>, HostError> {
        {
            let mut state = self.state.borrow_mut();
            state.requests.push(HostRequest::Unload(target.clone()));
            if state.resident_index(target).is_none() {
                return Err(HostError::NotResident {
                    target: target.clone(),
                });
            }
        }

        let state = Rc::clone(&self.state);
        let target = target.clone();
        let commit: Commit = Box::new(move || {
            let mut state = state.borrow_mut();
            match state.resident_index(&target) {
                Some(index) => {
                    let (scene, path) = state.resident.remove(index);
                    debug!("Host released {} ('{}')", scene, path);
                    Ok(())
                }
                None => Err(HostError::UnloadFailed {
                    target,
                    reason: "scene vanished before the unload finished".to_string(),
                }),
            }
        });

        Ok(Box::new(HeadlessOperation {
            remaining: self.unload_latency,
            commit: Some(commit),
        }))
    }
}

impl fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("environment", &self.environment)
            .field("load_latency", &self.load_latency)
            .field("unload_latency", &self.unload_latency)
            .field("resident", &self.resident_scenes())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
