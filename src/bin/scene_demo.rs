//=========================================================================
// Scene Demo
//
// Headless walkthrough of the scene loading protocol.
//
// Run with `RUST_LOG=debug` to see every state transition.
//
//=========================================================================

use std::process::ExitCode;

use aetheric_scene::prelude::*;
use log::{error, info};

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Demo failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), SchedulerError> {
    for environment in [HostEnvironment::Runtime, HostEnvironment::Editor] {
        info!("--- {:?} environment ---", environment);

        let mut runtime = SceneRuntimeBuilder::new()
            .with_environment(environment)
            .with_load_latency(3)
            .with_tps(60.0)
            .build();

        //--- Normal load --------------------------------------------------
        let level = Asset::new("scenes/level1");
        let scene = runtime.scene(level.clone());
        scene.load().on_completed(|scene| {
            info!("'{}' is loaded ({:?})", scene.asset_path(), scene.host_scene());
        });

        level.complete();
        let ticks = runtime.run_until_idle()?;
        info!("Level loaded after {} ticks", ticks);

        //--- Additive overlay, unloaded mid-load --------------------------
        let overlay = runtime.scene(Asset::loaded("scenes/overlay"));
        overlay.load_additive();
        runtime.tick();
        overlay.unload_scene();
        runtime.run_until_idle()?;
        info!("Overlay state after early unload: {:?}", overlay.state());

        //--- Teardown -----------------------------------------------------
        scene.unload_scene();
        runtime.run_until_idle()?;

        if let Some(host) = runtime.headless_host() {
            info!(
                "Host saw {} requests, {} scenes resident",
                host.requests().len(),
                host.resident_scenes().len()
            );
        }
    }

    Ok(())
}
