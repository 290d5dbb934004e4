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

//! Module containing all type definitions

use petgraph::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) type IndexType = u32;
/// Router identification (and index into the arena graph)
pub type RouterId = NodeIndex<IndexType>;

/// Arena graph owned by the simulator. Every router occupies one node; the node index is the
/// stable [`RouterId`] under which the router is addressed for its entire lifetime.
pub type RouterArena = StableGraph<(), (), Undirected, IndexType>;

/// Stable string identifier of a radio interface class (e.g. `wifi00` or `tetra00`).
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct PathType(String);

impl PathType {
    /// Create a new path type from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PathType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PathType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Type-of-service selector between the two forwarding tables.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Tos {
    /// Prefer the path with the smallest accumulated loss.
    #[serde(rename = "low_loss")]
    LowLoss,
    /// Prefer the path with the largest bottleneck bandwidth.
    #[serde(rename = "high_bandwidth")]
    HighBandwidth,
}

impl Tos {
    /// Both selectors, in the order in which tables are computed.
    pub const ALL: [Tos; 2] = [Tos::LowLoss, Tos::HighBandwidth];
}

impl std::fmt::Display for Tos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tos::LowLoss => f.write_str("low_loss"),
            Tos::HighBandwidth => f.write_str("high_bandwidth"),
        }
    }
}

/// Immutable description of a radio interface class.
///
/// A router owns an ordered sequence of these; the order breaks ties during interface
/// compression (see [`crate::fib`]).
#[derive(PartialEq, Eq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceProfile {
    /// Stable identifier of the radio class.
    pub path_type: PathType,
    /// Maximum communication range in meters.
    pub range: u32,
    /// Nominal bandwidth in units per second.
    pub bandwidth: u32,
    /// Expected loss in percent.
    pub loss: u32,
}

impl InterfaceProfile {
    /// Create a new interface profile.
    pub fn new(path_type: impl Into<PathType>, range: u32, bandwidth: u32, loss: u32) -> Self {
        Self {
            path_type: path_type.into(),
            range,
            bandwidth,
            loss,
        }
    }
}

/// Simulator errors
#[derive(Error, Debug)]
pub enum SimError {
    /// The router is not (or no longer) part of the simulation.
    #[error("Router was not found in the simulation: {0:?}")]
    RouterNotFound(RouterId),
    /// No router carries the given name.
    #[error("Router name was not found in the simulation: {0}")]
    RouterNameNotFound(String),
    /// Opening or preparing a per-router log file failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
