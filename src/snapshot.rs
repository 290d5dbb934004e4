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

//! Per-tick observer state.
//!
//! External collaborators (topology renderers, frame stitchers, video encoders) consume this
//! state; none of them is part of the simulator. Everything here serializes with serde, so a
//! snapshot stream can be dumped as JSON and rendered offline.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::types::{PathType, RouterId};

/// The public state of one simulation tick.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TickSnapshot {
    /// The tick this snapshot was taken at.
    pub tick: usize,
    /// One entry per router, in ascending id order.
    pub routers: Vec<RouterSnapshot>,
}

/// The public per-tick state of one router.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RouterSnapshot {
    /// Stable router id.
    pub id: RouterId,
    /// Human-readable name.
    pub name: String,
    /// Horizontal position in meters.
    pub x: f64,
    /// Vertical position in meters, growing downwards.
    pub y: f64,
    /// The network this router originates.
    pub prefix_v4: Ipv4Net,
    /// Whether the router advertised during this tick.
    pub transmitted_now: bool,
    /// Per-interface connectivity, in the declared interface order.
    pub interfaces: Vec<InterfaceSnapshot>,
}

/// The connectivity of one radio interface at one tick.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceSnapshot {
    /// The radio class.
    pub path_type: PathType,
    /// Communication range in meters.
    pub range: u32,
    /// All peers currently connected over this interface.
    pub peers: Vec<RouterId>,
}
