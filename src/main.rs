// MdvrSim: Mobile Distance-Vector Routing Simulator written in Rust
// Copyright 2024 The MdvrSim Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Run the fixed-seed reference simulation to completion, writing one log file per router.

use mdvrsim::prelude::*;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("simulation failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), SimError> {
    let cfg = SimConfig {
        log_dir: Some("logs".into()),
        ..Default::default()
    };

    // recreate the log directory, dropping the output of a previous run
    if let Some(dir) = &cfg.log_dir {
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
        }
        std::fs::create_dir_all(dir)?;
    }

    let mut sim = Simulator::random_topology(cfg, SimConfig::default_profiles())?;
    let horizon = sim.config().simulation_time;

    let mut delivered = 0usize;
    let mut dropped = 0usize;
    sim.run_with(|snapshot, outcomes| {
        for outcome in outcomes {
            if outcome.is_delivered() {
                delivered += 1;
            } else {
                dropped += 1;
            }
        }
        if snapshot.tick % 600 == 0 {
            log::info!("simulation time: {:6}/{}", snapshot.tick, horizon);
        }
    });

    println!(
        "simulated {} ticks over {} routers",
        sim.tick(),
        sim.num_routers()
    );
    println!("test packets delivered: {delivered}, dropped: {dropped}");
    Ok(())
}
