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

#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # MdvrSim
//!
//! This is a simulator for a multi-metric distance-vector routing protocol in a mobile
//! ad-hoc network. Each router owns several heterogeneous radio interfaces with differing
//! range, bandwidth and loss; nodes move across a bounded 2-D area, and the set of reachable
//! neighbors changes with the pairwise distances. The simulator does not model layers 1 to 4:
//! routers are addressed by an identifier ([`types::RouterId`]), advertisements are exchanged
//! as in-process values through a per-tick event queue, and radio propagation is reduced to a
//! range check.
//!
//! Every router periodically advertises its originated network and a snapshot of its
//! forwarding tables on each interface. Receivers keep the raw advertisements in a RIB
//! (filtered by per-interface sequence numbers and expired after a dead interval) and compute
//! two independent forwarding tables from it: a *low-loss* table with shortest paths by
//! accumulated loss, and a *high-bandwidth* table with widest paths by bottleneck bandwidth.
//! Data packets select one of the two with their type-of-service and traverse the network
//! hop by hop under TTL protection.
//!
//! The whole simulation is single-threaded and discrete: one tick is one logical second, and
//! given a seed, every run is bit-identical.
//!
//! ## Example usage
//!
//! The following example builds a three-node chain where the outer routers can only reach
//! each other through the middle one, lets the protocol converge, and checks the selected
//! route.
//!
//! ```
//! use mdvrsim::prelude::*;
//!
//! fn main() -> Result<(), SimError> {
//!     let cfg = SimConfig { area_x: 1_000, area_y: 10, ..Default::default() };
//!     let profiles = vec![InterfaceProfile::new("wifi00", 200, 5_000, 10)];
//!
//!     let mut sim = Simulator::new(cfg);
//!     let a = sim.add_router(
//!         "a", "10.0.1.0/24".parse().unwrap(), (0.0, 0.0),
//!         MobilityModel::stationary(), &profiles,
//!     )?;
//!     let b = sim.add_router(
//!         "b", "10.0.2.0/24".parse().unwrap(), (150.0, 0.0),
//!         MobilityModel::stationary(), &profiles,
//!     )?;
//!     let c = sim.add_router(
//!         "c", "10.0.3.0/24".parse().unwrap(), (300.0, 0.0),
//!         MobilityModel::stationary(), &profiles,
//!     )?;
//!     sim.sweep_neighbors();
//!
//!     // two advertisement rounds are enough to learn the remote routes
//!     for _ in 0..100 {
//!         sim.step_tick();
//!     }
//!
//!     let entry = &sim.get_router(a)?.fib().low_loss[&c];
//!     assert_eq!(entry.next_hop, b);
//!     assert_eq!(entry.full_path, vec![c, b, a]);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod event;
pub mod fib;
pub mod formatter;
pub mod forwarding;
pub mod logfile;
pub mod mobility;
pub mod packet;
pub mod prelude;
pub mod router;
pub mod sim;
pub mod snapshot;
pub mod types;

#[cfg(test)]
mod test;
