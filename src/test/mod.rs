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

//! Scenario tests driving the protocol engine and the public simulator interface.

use ipnet::Ipv4Net;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SimConfig;
use crate::logfile::RouterLog;
use crate::mobility::MobilityModel;
use crate::router::Router;
use crate::types::{InterfaceProfile, RouterId};

mod test_simulation;

fn pfx(s: &str) -> Ipv4Net {
    s.parse().unwrap()
}

/// A stationary router outside of any simulator, for protocol-level tests.
fn test_router(id: u32, profiles: &[InterfaceProfile]) -> (Router, SimConfig, StdRng) {
    let cfg = SimConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    let r = Router::new(
        format!("r{id}"),
        RouterId::from(id),
        pfx("10.0.0.0/24"),
        (0.0, 0.0),
        MobilityModel::stationary(),
        profiles,
        RouterLog::memory(),
        &cfg,
        &mut rng,
    );
    (r, cfg, rng)
}
