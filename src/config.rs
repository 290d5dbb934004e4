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

//! Static simulation parameters.

use std::path::PathBuf;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::types::InterfaceProfile;

lazy_static! {
    static ref DEFAULT_PROFILES: Vec<InterfaceProfile> = vec![
        InterfaceProfile::new("wifi00", 50, 10_000, 20),
        InterfaceProfile::new("tetra00", 200, 1_000, 5),
        InterfaceProfile::new("mmwave00", 100, 30_000, 30),
        InterfaceProfile::new("uhf00", 300, 2_000, 10),
    ];
}

/// All tunable parameters of a simulation run.
///
/// The defaults reproduce the reference scenario: three routers on a 960x1080 area, one
/// simulated hour, an advertisement period of 30 seconds with up to 7 seconds of jitter, and
/// RNG seed 1. Two runs with the same configuration produce bit-identical results.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of routers created by [`crate::sim::Simulator::random_topology`].
    pub num_routers: usize,
    /// Simulation horizon in ticks (one tick is one logical second).
    pub simulation_time: usize,
    /// Advertisement period in seconds.
    pub tx_interval: usize,
    /// Maximum additive jitter on the advertisement period.
    pub tx_jitter: usize,
    /// Width of the simulation area in meters.
    pub area_x: u32,
    /// Height of the simulation area in meters. Larger y is further down.
    pub area_y: u32,
    /// Initial TTL of injected data packets.
    pub default_ttl: u8,
    /// Seed for the single random number generator driving the whole run.
    pub seed: u64,
    /// Smallest mobility velocity in meters per tick.
    pub velocity_min: u32,
    /// Largest mobility velocity in meters per tick.
    pub velocity_max: u32,
    /// Directory for the per-router log files. `None` discards the logs.
    pub log_dir: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_routers: 3,
            simulation_time: 60 * 60,
            tx_interval: 30,
            tx_jitter: 30 / 4,
            area_x: 960,
            area_y: 1080,
            default_ttl: 16,
            seed: 1,
            velocity_min: 1,
            velocity_max: 1,
            log_dir: None,
        }
    }
}

impl SimConfig {
    /// Tolerance window for missed advertisements. An entry whose last reception is older than
    /// this is removed from the RIB.
    pub fn dead_interval(&self) -> usize {
        self.tx_interval * 3 + 1
    }

    /// The four radio classes used by the reference scenario.
    pub fn default_profiles() -> &'static [InterfaceProfile] {
        &DEFAULT_PROFILES
    }
}
