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

//! In-process protocol messages.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::fib::Fib;
use crate::types::{RouterId, Tos};

/// A routing advertisement, multicast one hop to every current neighbor on one interface.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RoutingPacket {
    /// The advertising router.
    pub router_id: RouterId,
    /// Per-interface sequence number, strictly monotonic across emitted advertisements.
    pub sequence_no: u32,
    /// Networks originated by the advertising router.
    pub networks: Vec<Ipv4Net>,
    /// Snapshot of the advertising router's forwarding tables, or empty if it has none yet.
    pub routing_paths: Fib,
}

impl RoutingPacket {
    /// Structural equality with the sequence number masked out.
    ///
    /// Two advertisements that only differ in their sequence number carry the same routing
    /// information; treating them as equal avoids a needless recomputation when a neighbor
    /// re-announces unchanged state. The forwarding-table snapshot participates in the
    /// comparison, so a changed snapshot always counts as fresh content.
    pub fn content_eq(&self, other: &Self) -> bool {
        self.router_id == other.router_id
            && self.networks == other.networks
            && self.routing_paths == other.routing_paths
    }
}

/// A unicast data packet traversing the forwarding plane.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DataPacket {
    /// Originating router.
    pub src_id: RouterId,
    /// Destination router.
    pub dst_id: RouterId,
    /// Remaining hop budget.
    pub ttl: u8,
    /// Which forwarding table serves this packet.
    pub tos: Tos,
}

impl DataPacket {
    /// Create a new data packet.
    pub fn new(src_id: RouterId, dst_id: RouterId, ttl: u8, tos: Tos) -> Self {
        Self {
            src_id,
            dst_id,
            ttl,
            tos,
        }
    }
}
