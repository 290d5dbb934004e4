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

//! Module for rendering simulator values with router names resolved.
//!
//! Router ids are bare indices; anything shown to a human should go through
//! [`SimFormatter`], which resolves the names against the simulator.

use itertools::Itertools;

use crate::fib::{Fib, FibEntry, FibTable};
use crate::forwarding::ForwardOutcome;
use crate::sim::Simulator;
use crate::types::{RouterId, Tos};

/// Render a value against the simulator that owns the referenced routers.
pub trait SimFormatter {
    /// Return the formatted string.
    fn fmt(&self, sim: &Simulator) -> String;
}

impl SimFormatter for RouterId {
    fn fmt(&self, sim: &Simulator) -> String {
        sim.get_router(*self)
            .map(|r| r.name().to_string())
            .unwrap_or_else(|_| format!("?{}", self.index()))
    }
}

impl SimFormatter for [RouterId] {
    fn fmt(&self, sim: &Simulator) -> String {
        self.iter().map(|r| r.fmt(sim)).join(" -> ")
    }
}

impl SimFormatter for FibEntry {
    fn fmt(&self, sim: &Simulator) -> String {
        format!(
            "via {} on {}, path: {}, networks: [{}]",
            self.next_hop.fmt(sim),
            self.interface,
            self.full_path.fmt(sim),
            self.networks.iter().join(", "),
        )
    }
}

impl SimFormatter for FibTable {
    fn fmt(&self, sim: &Simulator) -> String {
        self.iter()
            .map(|(dst, entry)| format!("  {}: {}", dst.fmt(sim), entry.fmt(sim)))
            .join("\n")
    }
}

impl SimFormatter for Fib {
    fn fmt(&self, sim: &Simulator) -> String {
        Tos::ALL
            .iter()
            .map(|tos| format!("{}:\n{}", tos, self.table(*tos).fmt(sim)))
            .join("\n")
    }
}

impl SimFormatter for ForwardOutcome {
    fn fmt(&self, sim: &Simulator) -> String {
        match self {
            ForwardOutcome::Delivered { path } => {
                format!("delivered: {}", path.fmt(sim))
            }
            ForwardOutcome::Dropped { path, at, reason } => {
                format!("dropped at {} ({reason}): {}", at.fmt(sim), path.fmt(sim))
            }
        }
    }
}
