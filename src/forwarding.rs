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

//! Forwarding-plane decisions and outcomes.
//!
//! A router only decides what happens to a packet at its own hop; the simulator walks the
//! resulting chain hop by hop (see [`crate::sim::Simulator::dispatch`]). Every failure mode
//! is an outcome, never an error: a dropped packet is logged and the simulation continues.

use serde::{Deserialize, Serialize};

use crate::types::{PathType, RouterId};

/// The decision taken by a single router for one packet.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub enum FwDecision {
    /// The packet reached its destination.
    Deliver,
    /// Hand the packet to the given neighbor over the given interface.
    Forward {
        /// The next hop (a current neighbor on `path_type`).
        next_hop: RouterId,
        /// The interface the forwarding entry was learned on.
        path_type: PathType,
    },
    /// Drop the packet.
    Drop(DropReason),
}

/// Why a packet was dropped.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum DropReason {
    /// The hop budget is exhausted at a non-destination, which suggests a forwarding loop.
    TtlExpired,
    /// The forwarding table has no entry for the destination under the requested TOS.
    NoRoute,
    /// The recorded next hop is no longer a neighbor on the recorded interface. This is a
    /// consistency violation between FIB and neighbor state; the packet is dropped and the
    /// simulation continues.
    NextHopUnreachable,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::TtlExpired => f.write_str("routing loop detected"),
            DropReason::NoRoute => f.write_str("ICMP: no route to host"),
            DropReason::NextHopUnreachable => f.write_str("next-hop unreachable"),
        }
    }
}

/// The fate of one injected packet after traversing the forwarding plane.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub enum ForwardOutcome {
    /// The packet arrived at its destination over the recorded path.
    Delivered {
        /// All routers the packet visited, source first.
        path: Vec<RouterId>,
    },
    /// The packet was dropped before reaching its destination.
    Dropped {
        /// All routers the packet visited, source first.
        path: Vec<RouterId>,
        /// The router that dropped the packet.
        at: RouterId,
        /// Why it was dropped.
        reason: DropReason,
    },
}

impl ForwardOutcome {
    /// Whether the packet reached its destination.
    pub fn is_delivered(&self) -> bool {
        matches!(self, ForwardOutcome::Delivered { .. })
    }

    /// The routers the packet visited, source first.
    pub fn path(&self) -> &[RouterId] {
        match self {
            ForwardOutcome::Delivered { path } | ForwardOutcome::Dropped { path, .. } => path,
        }
    }
}
