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

//! Module defining a single router and its distance-vector protocol engine.
//!
//! A router owns its position, one neighbor table and sequence counter per radio interface,
//! the raw inbound advertisements (RIB), and the two computed forwarding tables (FIB). All
//! interaction with other routers goes through the simulator: transmissions are returned as
//! [`AdvertisementEvent`]s, receptions arrive through [`Router::handle_route_packet`], and
//! forwarding decisions are taken one hop at a time.

use std::collections::{BTreeMap, BTreeSet};

use ipnet::Ipv4Net;
use rand::Rng;

use crate::config::SimConfig;
use crate::event::AdvertisementEvent;
use crate::fib::{self, Fib};
use crate::forwarding::{DropReason, FwDecision};
use crate::logfile::RouterLog;
use crate::mobility::MobilityModel;
use crate::packet::{DataPacket, RoutingPacket};
use crate::snapshot::{InterfaceSnapshot, RouterSnapshot};
use crate::types::{InterfaceProfile, PathType, RouterId};

/// Mutable per-interface state: the current neighbors and the sequence counter.
///
/// Sequence numbers are interface specific. With n interfaces, each potentially on its own
/// transmission schedule, the counters must advance independently.
#[derive(Debug, Clone)]
pub struct InterfaceState {
    /// The immutable radio class description.
    pub profile: InterfaceProfile,
    pub(crate) neighbors: BTreeSet<RouterId>,
    pub(crate) sequence_no: u32,
}

impl InterfaceState {
    fn new(profile: InterfaceProfile) -> Self {
        Self {
            profile,
            neighbors: BTreeSet::new(),
            sequence_no: 0,
        }
    }

    /// The routers currently within range on this interface, in ascending id order.
    pub fn neighbors(&self) -> &BTreeSet<RouterId> {
        &self.neighbors
    }

    /// The sequence number the next advertisement on this interface will carry.
    pub fn sequence_no(&self) -> u32 {
        self.sequence_no
    }
}

/// A received advertisement retained until the dead interval expires.
#[derive(Debug, Clone, PartialEq)]
pub struct RibEntry {
    /// Local tick at which the advertisement was last received.
    pub rx_time: usize,
    /// The advertisement itself.
    pub packet: RoutingPacket,
}

/// Raw inbound advertisements: interface class to sender to retained entry.
pub type Rib = BTreeMap<PathType, BTreeMap<RouterId, RibEntry>>;

/// A single mobile router.
#[derive(Debug)]
pub struct Router {
    name: String,
    router_id: RouterId,
    prefix_v4: Ipv4Net,
    x: f64,
    y: f64,
    mobility: MobilityModel,
    time: usize,
    next_tx_time: usize,
    interfaces: Vec<InterfaceState>,
    rib: Rib,
    fib: Fib,
    transmitted_now: bool,
    stale_rx: usize,
    recomputations: usize,
    log: RouterLog,
}

impl Router {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new<R: Rng>(
        name: String,
        router_id: RouterId,
        prefix_v4: Ipv4Net,
        position: (f64, f64),
        mobility: MobilityModel,
        profiles: &[InterfaceProfile],
        mut log: RouterLog,
        cfg: &SimConfig,
        rng: &mut R,
    ) -> Self {
        log.line(0, format!("Initialize router {}", router_id.index()));
        log.line(0, format!("  v4 prefix:{prefix_v4}"));
        let rib = profiles
            .iter()
            .map(|p| (p.path_type.clone(), BTreeMap::new()))
            .collect();
        let next_tx_time = cfg.tx_interval + rng.gen_range(0..=cfg.tx_jitter);
        Self {
            name,
            router_id,
            prefix_v4,
            x: position.0,
            y: position.1,
            mobility,
            time: 0,
            next_tx_time,
            interfaces: profiles.iter().cloned().map(InterfaceState::new).collect(),
            rib,
            fib: Fib::default(),
            transmitted_now: false,
            stale_rx: 0,
            recomputations: 0,
            log,
        }
    }

    /// Return the id of the router.
    pub fn router_id(&self) -> RouterId {
        self.router_id
    }

    /// Return the name of the router.
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// The network originated by this router.
    pub fn prefix_v4(&self) -> Ipv4Net {
        self.prefix_v4
    }

    /// Current position in the simulation area.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// The local tick counter.
    pub fn time(&self) -> usize {
        self.time
    }

    /// Whether this router advertised during the current tick.
    pub fn transmitted_now(&self) -> bool {
        self.transmitted_now
    }

    /// The two computed forwarding tables.
    pub fn fib(&self) -> &Fib {
        &self.fib
    }

    /// The raw inbound advertisements.
    pub fn rib(&self) -> &Rib {
        &self.rib
    }

    /// The per-interface state, in the declared interface order.
    pub fn interfaces(&self) -> &[InterfaceState] {
        &self.interfaces
    }

    /// The interface state for the given radio class.
    pub fn interface(&self, path_type: &PathType) -> Option<&InterfaceState> {
        self.interfaces
            .iter()
            .find(|ifs| &ifs.profile.path_type == path_type)
    }

    /// Number of stale or duplicate advertisements that were discarded.
    pub fn stale_rx(&self) -> usize {
        self.stale_rx
    }

    /// Number of forwarding-table recomputations so far.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// The persisted event log of this router.
    pub fn log(&self) -> &RouterLog {
        &self.log
    }

    /// All RIB entries in deterministic order: the declared interface sequence first, then
    /// ascending sender id.
    pub(crate) fn rib_entries(&self) -> impl Iterator<Item = (&PathType, RouterId, &RibEntry)> {
        self.interfaces
            .iter()
            .filter_map(|ifs| {
                self.rib
                    .get(&ifs.profile.path_type)
                    .map(|entries| (&ifs.profile.path_type, entries))
            })
            .flat_map(|(pt, entries)| entries.iter().map(move |(id, e)| (pt, *id, e)))
    }

    /// Advance this router by one tick: move, expire stale RIB entries, and advertise if the
    /// transmission timer fired. Returns the advertisements to deliver.
    pub(crate) fn step<R: Rng>(
        &mut self,
        cfg: &SimConfig,
        rng: &mut R,
    ) -> Vec<AdvertisementEvent> {
        self.time += 1;
        let (x, y) = self
            .mobility
            .step(self.x, self.y, cfg.area_x as f64, cfg.area_y as f64);
        self.x = x;
        self.y = y;

        if self.expire_outdated(cfg.dead_interval()) {
            self.recompute_fib();
        }

        if self.time == self.next_tx_time {
            let events = self.build_advertisements();
            self.next_tx_time = self.time + cfg.tx_interval + rng.gen_range(0..=cfg.tx_jitter);
            self.transmitted_now = true;
            events
        } else {
            self.transmitted_now = false;
            Vec::new()
        }
    }

    /// Update the neighbor tables from a freshly computed distance to `other`. The distance
    /// sweep is the only place where neighbors appear or disappear.
    pub(crate) fn update_distance(&mut self, dist: f64, other: RouterId) {
        for ifs in &mut self.interfaces {
            if dist <= f64::from(ifs.profile.range) {
                ifs.neighbors.insert(other);
            } else {
                ifs.neighbors.remove(&other);
            }
        }
    }

    /// Remove `other` from every neighbor table, used when a router leaves the simulation.
    /// RIB entries from it age out through the regular dead interval.
    pub(crate) fn purge_neighbor(&mut self, other: RouterId) {
        for ifs in &mut self.interfaces {
            ifs.neighbors.remove(&other);
        }
    }

    /// Build one advertisement per interface and address it to every current neighbor on
    /// that interface. Sequence counters advance independently per interface.
    pub(crate) fn build_advertisements(&mut self) -> Vec<AdvertisementEvent> {
        let snapshot = self.fib.clone();
        let mut events = Vec::new();
        for ifs in &mut self.interfaces {
            let packet = RoutingPacket {
                router_id: self.router_id,
                sequence_no: ifs.sequence_no,
                networks: vec![self.prefix_v4],
                routing_paths: snapshot.clone(),
            };
            ifs.sequence_no += 1;
            for dst in &ifs.neighbors {
                events.push(AdvertisementEvent {
                    src: self.router_id,
                    dst: *dst,
                    path_type: ifs.profile.path_type.clone(),
                    packet: packet.clone(),
                });
            }
        }
        events
    }

    /// Receive an advertisement from `src` over `path_type`, and recompute the forwarding
    /// tables if it changed the RIB.
    pub(crate) fn handle_route_packet(
        &mut self,
        src: RouterId,
        path_type: &PathType,
        packet: RoutingPacket,
    ) {
        self.log.line(
            self.time,
            format!(
                "rx route packet from {}, interface:{}, seq-no:{}",
                src.index(),
                path_type,
                packet.sequence_no
            ),
        );
        if self.save_routing_data(src, path_type, packet) {
            self.recompute_fib();
        }
    }

    /// Store a received advertisement in the RIB. Returns whether a recomputation of the
    /// forwarding tables is required.
    fn save_routing_data(
        &mut self,
        src: RouterId,
        path_type: &PathType,
        packet: RoutingPacket,
    ) -> bool {
        let time = self.time;
        let Some(entries) = self.rib.get_mut(path_type) else {
            log::warn!(
                "{}: advertisement from {} on unknown interface {path_type}",
                self.router_id.index(),
                src.index(),
            );
            return false;
        };
        match entries.get_mut(&src) {
            None => {
                // new entry, or an expired one that comes back again
                entries.insert(src, RibEntry {
                    rx_time: time,
                    packet,
                });
                true
            }
            Some(entry) => {
                self.log.line(time, "existing entry");
                if packet.sequence_no <= entry.packet.sequence_no {
                    self.log
                        .line(time, "receive duplicate or outdated route packet -> ignore it");
                    self.stale_rx += 1;
                    return false;
                }
                // identical content still refreshes the stored packet (think of the updated
                // sequence number), but does not require a recomputation
                let changed = !entry.packet.content_eq(&packet);
                entry.rx_time = time;
                entry.packet = packet;
                changed
            }
        }
    }

    /// Drop every RIB entry whose last reception is older than the dead interval. Returns
    /// whether anything was removed.
    fn expire_outdated(&mut self, dead_interval: usize) -> bool {
        let time = self.time;
        let mut removed_any = false;
        for ifs in &self.interfaces {
            let Some(entries) = self.rib.get_mut(&ifs.profile.path_type) else {
                continue;
            };
            let outdated: Vec<(RouterId, usize)> = entries
                .iter()
                .filter(|(_, e)| time - e.rx_time > dead_interval)
                .map(|(id, e)| (*id, e.rx_time))
                .collect();
            for (id, rx_time) in outdated {
                self.log.line(
                    time,
                    format!(
                        "outdated entry from {} received at {rx_time}, interface: {} - drop it",
                        id.index(),
                        ifs.profile.path_type
                    ),
                );
                entries.remove(&id);
                removed_any = true;
            }
        }
        removed_any
    }

    /// Recompute both forwarding tables from scratch and dump them to the event log.
    fn recompute_fib(&mut self) {
        self.log.line(self.time, "recalculate routing table");
        self.recomputations += 1;
        self.fib = fib::compute(self);
        match serde_json::to_string_pretty(&self.fib) {
            Ok(dump) => self.log.line(self.time, dump),
            Err(e) => log::error!(
                "{}: rendering the forwarding tables failed: {e}",
                self.router_id.index()
            ),
        }
    }

    /// Decide the fate of a data packet at this hop.
    pub(crate) fn forward_decision(&mut self, packet: &DataPacket) -> FwDecision {
        if packet.dst_id == self.router_id {
            self.log.line(
                self.time,
                format!(
                    "packet src:{} dst:{} reached its destination",
                    packet.src_id.index(),
                    packet.dst_id.index()
                ),
            );
            return FwDecision::Deliver;
        }
        if packet.ttl == 0 {
            self.log
                .line(self.time, format!("{}, drop packet", DropReason::TtlExpired));
            return FwDecision::Drop(DropReason::TtlExpired);
        }
        let Some(entry) = self.fib.table(packet.tos).get(&packet.dst_id) else {
            self.log
                .line(self.time, format!("{}, drop packet", DropReason::NoRoute));
            return FwDecision::Drop(DropReason::NoRoute);
        };
        let next_hop = entry.next_hop;
        let path_type = entry.interface.clone();
        let connected = self
            .interface(&path_type)
            .map(|ifs| ifs.neighbors.contains(&next_hop))
            .unwrap_or(false);
        if !connected {
            log::warn!(
                "{}: forwarding entry for {} points to {} on {}, which is not a neighbor",
                self.router_id.index(),
                packet.dst_id.index(),
                next_hop.index(),
                path_type
            );
            self.log.line(
                self.time,
                format!("{}, drop packet", DropReason::NextHopUnreachable),
            );
            return FwDecision::Drop(DropReason::NextHopUnreachable);
        }
        self.log.line(
            self.time,
            format!(
                "packet src:{} dst:{} tos:{} -> next-hop {} via {}",
                packet.src_id.index(),
                packet.dst_id.index(),
                packet.tos,
                next_hop.index(),
                path_type
            ),
        );
        FwDecision::Forward {
            next_hop,
            path_type,
        }
    }

    /// The public per-tick state consumed by external renderers.
    pub fn snapshot(&self) -> RouterSnapshot {
        RouterSnapshot {
            id: self.router_id,
            name: self.name.clone(),
            x: self.x,
            y: self.y,
            prefix_v4: self.prefix_v4,
            transmitted_now: self.transmitted_now,
            interfaces: self
                .interfaces
                .iter()
                .map(|ifs| InterfaceSnapshot {
                    path_type: ifs.profile.path_type.clone(),
                    range: ifs.profile.range,
                    peers: ifs.neighbors.iter().copied().collect(),
                })
                .collect(),
        }
    }

    /// Flush the persisted event log to disk.
    pub(crate) fn flush_log(&mut self) {
        self.log.flush()
    }
}
