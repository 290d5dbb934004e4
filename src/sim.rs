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

//! # Top-level simulator module
//!
//! The [`Simulator`] owns every router, the seeded random number generator, and the
//! advertisement queue, and it drives the discrete one-second ticks. Within a tick the order
//! of operations is fixed: every router steps in ascending id order (mobility, liveness,
//! conditional transmission), the advertisement queue is drained, the global pairwise
//! neighbor sweep runs, and finally the standing test packets are injected. Changing this
//! order changes observable results; keeping it fixed makes the whole simulation a pure
//! function of the configuration.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::event::EventQueue;
use crate::forwarding::{ForwardOutcome, FwDecision};
use crate::mobility::MobilityModel;
use crate::packet::DataPacket;
use crate::router::Router;
use crate::snapshot::TickSnapshot;
use crate::types::{InterfaceProfile, RouterArena, RouterId, SimError, Tos};

/// A standing test flow, re-injected at its source router on every tick.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Flow {
    /// Source router.
    pub src: RouterId,
    /// Destination router.
    pub dst: RouterId,
    /// The forwarding table serving this flow.
    pub tos: Tos,
}

/// # Simulator
///
/// The struct owns all routers, manages the arena of router ids, and handles all events
/// between the routers.
///
/// ```rust
/// use mdvrsim::prelude::*;
///
/// fn main() -> Result<(), SimError> {
///     let cfg = SimConfig {
///         num_routers: 2,
///         simulation_time: 60,
///         ..Default::default()
///     };
///     let profiles = vec![InterfaceProfile::new("wifi00", 500, 1_000, 5)];
///     let mut sim = Simulator::random_topology(cfg, &profiles)?;
///     sim.run();
///     assert_eq!(sim.tick(), 60);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Simulator {
    cfg: SimConfig,
    arena: RouterArena,
    routers: BTreeMap<RouterId, Router>,
    queue: EventQueue,
    rng: StdRng,
    tick: usize,
    flows: Vec<Flow>,
}

impl Simulator {
    /// Generate an empty simulator with the given configuration. The random number
    /// generator is seeded here; every later draw goes through it.
    pub fn new(cfg: SimConfig) -> Self {
        let rng = StdRng::seed_from_u64(cfg.seed);
        Self {
            cfg,
            arena: RouterArena::default(),
            routers: BTreeMap::new(),
            queue: EventQueue::new(),
            rng,
            tick: 0,
            flows: Vec::new(),
        }
    }

    /// Build a simulator with `cfg.num_routers` randomly placed routers (all carrying the
    /// given interface profiles), run the initial neighbor sweep, and register the two
    /// standing test flows with randomly drawn endpoints, one per type-of-service.
    pub fn random_topology(
        cfg: SimConfig,
        profiles: &[InterfaceProfile],
    ) -> Result<Self, SimError> {
        let mut sim = Self::new(cfg);
        for i in 0..sim.cfg.num_routers {
            let prefix = random_prefix(&mut sim.rng);
            let x = sim.rng.gen_range(0..=sim.cfg.area_x) as f64;
            let y = sim.rng.gen_range(0..=sim.cfg.area_y) as f64;
            let mobility = MobilityModel::random(&mut sim.rng, &sim.cfg);
            sim.add_router(format!("r{i}"), prefix, (x, y), mobility, profiles)?;
        }

        // initial positioning
        sim.sweep_neighbors();

        let ids: Vec<RouterId> = sim.routers.keys().copied().collect();
        if !ids.is_empty() {
            let src = ids[sim.rng.gen_range(0..ids.len())];
            let dst = ids[sim.rng.gen_range(0..ids.len())];
            sim.add_flow(src, dst, Tos::LowLoss);
            sim.add_flow(src, dst, Tos::HighBandwidth);
        }
        Ok(sim)
    }

    /// Add a new router to the simulation. This function returns the id of the router, which
    /// can be used to reference it afterwards.
    pub fn add_router(
        &mut self,
        name: impl Into<String>,
        prefix_v4: Ipv4Net,
        position: (f64, f64),
        mobility: MobilityModel,
        profiles: &[InterfaceProfile],
    ) -> Result<RouterId, SimError> {
        let router_id = self.arena.add_node(());
        let log = match &self.cfg.log_dir {
            Some(dir) => {
                let log = std::fs::create_dir_all(dir)
                    .and_then(|()| crate::logfile::RouterLog::file(dir, router_id.index()));
                match log {
                    Ok(log) => log,
                    Err(e) => {
                        self.arena.remove_node(router_id);
                        return Err(e.into());
                    }
                }
            }
            None => crate::logfile::RouterLog::discard(),
        };
        let router = Router::new(
            name.into(),
            router_id,
            prefix_v4,
            position,
            mobility,
            profiles,
            log,
            &self.cfg,
            &mut self.rng,
        );
        self.routers.insert(router_id, router);
        Ok(router_id)
    }

    /// Remove a router from the simulation. It disappears from every neighbor table right
    /// away; its RIB entries on the remaining routers age out through the dead interval.
    /// Test flows towards or from the removed router are dropped.
    pub fn remove_router(&mut self, router_id: RouterId) -> Result<(), SimError> {
        self.routers
            .remove(&router_id)
            .ok_or(SimError::RouterNotFound(router_id))?;
        self.arena.remove_node(router_id);
        for r in self.routers.values_mut() {
            r.purge_neighbor(router_id);
        }
        self.flows
            .retain(|f| f.src != router_id && f.dst != router_id);
        Ok(())
    }

    /// Register a standing test flow, injected at its source on every tick.
    pub fn add_flow(&mut self, src: RouterId, dst: RouterId, tos: Tos) {
        self.flows.push(Flow { src, dst, tos });
    }

    /// The registered standing test flows.
    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    /// The simulation parameters.
    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    /// The number of completed ticks.
    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Returns the number of routers in the simulation.
    pub fn num_routers(&self) -> usize {
        self.routers.len()
    }

    /// Return an iterator over all routers, in ascending id order.
    pub fn routers(&self) -> std::collections::btree_map::Values<'_, RouterId, Router> {
        self.routers.values()
    }

    /// Returns a reference to a router.
    pub fn get_router(&self, router_id: RouterId) -> Result<&Router, SimError> {
        self.routers
            .get(&router_id)
            .ok_or(SimError::RouterNotFound(router_id))
    }

    /// Returns a mutable reference to a router.
    pub(crate) fn get_router_mut(&mut self, router_id: RouterId) -> Result<&mut Router, SimError> {
        self.routers
            .get_mut(&router_id)
            .ok_or(SimError::RouterNotFound(router_id))
    }

    /// Get the id of the router with the given name. If multiple routers carry the same
    /// name, the first occurrence is returned.
    pub fn get_router_id(&self, name: impl AsRef<str>) -> Result<RouterId, SimError> {
        self.routers
            .iter()
            .filter(|(_, r)| r.name() == name.as_ref())
            .map(|(id, _)| *id)
            .next()
            .ok_or_else(|| SimError::RouterNameNotFound(name.as_ref().to_string()))
    }

    /// The number of RIB entries currently held across all routers.
    pub fn active_neighbor_info(&self) -> usize {
        self.routers
            .values()
            .map(|r| r.rib().values().map(BTreeMap::len).sum::<usize>())
            .sum()
    }

    /// Execute one simulation tick and return the outcome of every injected test packet.
    pub fn step_tick(&mut self) -> Vec<ForwardOutcome> {
        self.tick += 1;
        log::trace!("simulation time: {}", self.tick);

        // every router steps in ascending id order
        let ids: Vec<RouterId> = self.routers.keys().copied().collect();
        for id in &ids {
            if let Some(r) = self.routers.get_mut(id) {
                let events = r.step(&self.cfg, &mut self.rng);
                self.queue.push_many(events);
            }
        }

        // deliver all advertisements of this tick
        self.drain_queue();

        // recompute the neighbor sets from the new positions
        self.sweep_neighbors();

        // inject the standing test packets
        let flows = self.flows.clone();
        let mut outcomes = Vec::with_capacity(flows.len());
        for flow in flows {
            let packet = DataPacket::new(flow.src, flow.dst, self.cfg.default_ttl, flow.tos);
            match self.dispatch(packet) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => log::warn!("cannot inject test packet: {e}"),
            }
        }
        outcomes
    }

    /// Run the simulation to the configured horizon.
    pub fn run(&mut self) {
        while self.tick < self.cfg.simulation_time {
            self.step_tick();
        }
        self.flush_logs();
    }

    /// Run the simulation to the configured horizon, calling the observer with the public
    /// state and the packet outcomes after every tick.
    pub fn run_with<F>(&mut self, mut observer: F)
    where
        F: FnMut(&TickSnapshot, &[ForwardOutcome]),
    {
        while self.tick < self.cfg.simulation_time {
            let outcomes = self.step_tick();
            let snapshot = self.snapshot();
            observer(&snapshot, &outcomes);
        }
        self.flush_logs();
    }

    /// Recompute every neighbor set from the current pairwise distances. This sweep is the
    /// only way neighbor entries appear or disappear.
    pub fn sweep_neighbors(&mut self) {
        let positions: Vec<(RouterId, f64, f64)> = self
            .routers
            .values()
            .map(|r| {
                let (x, y) = r.position();
                (r.router_id(), x, y)
            })
            .collect();
        for (jid, router) in self.routers.iter_mut() {
            let (xj, yj) = router.position();
            for &(iid, xi, yi) in &positions {
                if iid == *jid {
                    continue;
                }
                let dist = f64::hypot(yi - yj, xi - xj);
                router.update_distance(dist, iid);
            }
        }
    }

    /// Deliver all queued advertisements of the current tick.
    fn drain_queue(&mut self) {
        while let Some(ev) = self.queue.pop() {
            match self.routers.get_mut(&ev.dst) {
                Some(r) => r.handle_route_packet(ev.src, &ev.path_type, ev.packet),
                None => log::trace!(
                    "dropping advertisement towards removed router {}",
                    ev.dst.index()
                ),
            }
        }
    }

    /// Inject a data packet at its source router and walk it hop by hop until it is either
    /// delivered or dropped. Forwarding is synchronous within a tick; there is no queueing.
    pub fn dispatch(&mut self, mut packet: DataPacket) -> Result<ForwardOutcome, SimError> {
        let mut current = packet.src_id;
        let mut path = vec![current];
        loop {
            let router = self.get_router_mut(current)?;
            match router.forward_decision(&packet) {
                FwDecision::Deliver => return Ok(ForwardOutcome::Delivered { path }),
                FwDecision::Drop(reason) => {
                    return Ok(ForwardOutcome::Dropped {
                        path,
                        at: current,
                        reason,
                    })
                }
                FwDecision::Forward { next_hop, .. } => {
                    packet.ttl -= 1;
                    path.push(next_hop);
                    current = next_hop;
                }
            }
        }
    }

    /// Capture the public per-tick state consumed by external renderers.
    pub fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            tick: self.tick,
            routers: self.routers.values().map(Router::snapshot).collect(),
        }
    }

    /// Flush every per-router log file to disk.
    pub fn flush_logs(&mut self) {
        for r in self.routers.values_mut() {
            r.flush_log();
        }
    }
}

/// Draw a random `/24` prefix for a new router.
fn random_prefix<R: Rng>(rng: &mut R) -> Ipv4Net {
    let addr = Ipv4Addr::from(rng.gen_range(0..4_000_000_000u32));
    let [a, b, c, _] = addr.octets();
    Ipv4Net::new(Ipv4Addr::new(a, b, c, 0), 24).expect("/24 is a valid prefix length")
}
