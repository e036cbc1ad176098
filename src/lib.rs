//=========================================================================
// Aetheric Scene: Library Root
//
// This crate loads and unloads scenes whose content depends on an asset
// that must finish loading first.
//
// Responsibilities:
// - Expose the per-scene state machine (`SceneController`)
// - Define the contracts for assets, hosts and the scheduler
// - Provide a ready-made runtime facade (`SceneRuntime`)
//
// Typical usage:
// ```
// use aetheric_scene::prelude::*;
//
// let mut runtime = SceneRuntimeBuilder::new().build();
// let asset = Asset::new("scenes/title");
// let scene = runtime.scene(asset.clone());
//
// scene.load();
// asset.complete();
// runtime.run_until_idle().unwrap();
// assert!(scene.is_loaded());
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the protocol pieces (assets, hosts, scheduler, scene
// controller). Most applications only need the runtime facade and the
// prelude.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `engine` wires a scheduler and a host together.
//
mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{SceneRuntime, SceneRuntimeBuilder};
