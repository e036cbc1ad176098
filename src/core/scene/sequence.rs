//=========================================================================
// Load / Unload Sequences
//=========================================================================
//
// Step-function tasks run by the scheduler on behalf of a controller.
// Each dispatch creates a fresh sequence; they are never reused.
//
// LoadSequence:
//   Begin ─► AwaitLoad ─► Settle ─┬─► Done                (still Loading)
//     │                           └─► AwaitUnload ─► Done (unload requested)
//     └─ editor host: resident immediately, skips AwaitLoad
//
// UnloadSequence:
//   Begin ─► AwaitUnload ─► Done
//
// Suspension only happens while a host operation is pending.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::mem;

//=== Internal Dependencies ===============================================

use super::controller::{LoadOutcome, SceneController};
use crate::core::host::{BeginLoad, HostOperation, OperationStatus};
use crate::core::scheduler::{Task, TaskPoll};

//=== LoadSequence ========================================================

enum LoadStep {
    Begin,
    AwaitLoad(Box<dyn HostOperation>),
    Settle,
    AwaitUnload(Box<dyn HostOperation>),
    Done,
}

pub(super) struct LoadSequence {
    scene: SceneController,
    label: String,
    step: LoadStep,
}

impl LoadSequence {
    pub(super) fn new(scene: SceneController) -> Self {
        let label = format!("load '{}'", scene.asset_path());
        Self {
            scene,
            label,
            step: LoadStep::Begin,
        }
    }
}

impl Task for LoadSequence {
    fn name(&self) -> &str {
        &self.label
    }

    fn poll(&mut self) -> TaskPoll {
        loop {
            self.step = match mem::replace(&mut self.step, LoadStep::Done) {
                LoadStep::Begin => {
                    let (path, mode) = self.scene.load_request();
                    match self.scene.host().begin_load(&path, mode) {
                        Ok(BeginLoad::Pending(op)) => LoadStep::AwaitLoad(op),
                        Ok(BeginLoad::Resident(scene)) => {
                            self.scene.mark_resident(scene);
                            LoadStep::Settle
                        }
                        Err(err) => {
                            self.scene.fail_load(err);
                            LoadStep::Done
                        }
                    }
                }

                LoadStep::AwaitLoad(mut op) => match op.poll() {
                    Ok(OperationStatus::Pending) => {
                        self.step = LoadStep::AwaitLoad(op);
                        return TaskPoll::Pending;
                    }
                    Ok(OperationStatus::Complete) => LoadStep::Settle,
                    Err(err) => {
                        self.scene.fail_load(err);
                        LoadStep::Done
                    }
                },

                LoadStep::Settle => match self.scene.complete_load() {
                    LoadOutcome::Loaded | LoadOutcome::Abandoned => LoadStep::Done,
                    LoadOutcome::UnloadRequested(target) => {
                        match self.scene.host().begin_unload(&target) {
                            Ok(op) => LoadStep::AwaitUnload(op),
                            Err(err) => {
                                self.scene.finish_unload(Err(err));
                                LoadStep::Done
                            }
                        }
                    }
                },

                LoadStep::AwaitUnload(mut op) => match op.poll() {
                    Ok(OperationStatus::Pending) => {
                        self.step = LoadStep::AwaitUnload(op);
                        return TaskPoll::Pending;
                    }
                    Ok(OperationStatus::Complete) => {
                        self.scene.finish_unload(Ok(()));
                        LoadStep::Done
                    }
                    Err(err) => {
                        self.scene.finish_unload(Err(err));
                        LoadStep::Done
                    }
                },

                LoadStep::Done => return TaskPoll::Complete,
            };
        }
    }
}

//=== UnloadSequence ======================================================

enum UnloadStep {
    Begin,
    AwaitUnload(Box<dyn HostOperation>),
    Done,
}

pub(super) struct UnloadSequence {
    scene: SceneController,
    label: String,
    step: UnloadStep,
}

impl UnloadSequence {
    pub(super) fn new(scene: SceneController) -> Self {
        let label = format!("unload '{}'", scene.asset_path());
        Self {
            scene,
            label,
            step: UnloadStep::Begin,
        }
    }
}

impl Task for UnloadSequence {
    fn name(&self) -> &str {
        &self.label
    }

    fn poll(&mut self) -> TaskPoll {
        loop {
            self.step = match mem::replace(&mut self.step, UnloadStep::Done) {
                UnloadStep::Begin => {
                    let target = self.scene.unload_target();
                    match self.scene.host().begin_unload(&target) {
                        Ok(op) => UnloadStep::AwaitUnload(op),
                        Err(err) => {
                            self.scene.finish_unload(Err(err));
                            UnloadStep::Done
                        }
                    }
                }

                UnloadStep::AwaitUnload(mut op) => match op.poll() {
                    Ok(OperationStatus::Pending) => {
                        self.step = UnloadStep::AwaitUnload(op);
                        return TaskPoll::Pending;
                    }
                    Ok(OperationStatus::Complete) => {
                        self.scene.finish_unload(Ok(()));
                        UnloadStep::Done
                    }
                    Err(err) => {
                        self.scene.finish_unload(Err(err));
                        UnloadStep::Done
                    }
                },

                UnloadStep::Done => return TaskPoll::Complete,
            };
        }
    }
}
