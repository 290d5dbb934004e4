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

//! Convenience re-export of common members

pub use crate::config::SimConfig;
pub use crate::fib::{Fib, FibEntry, FibTable};
pub use crate::formatter::SimFormatter;
pub use crate::forwarding::{DropReason, ForwardOutcome};
pub use crate::mobility::{Direction, MobilityModel};
pub use crate::packet::DataPacket;
pub use crate::router::Router;
pub use crate::sim::Simulator;
pub use crate::snapshot::TickSnapshot;
pub use crate::types::{InterfaceProfile, PathType, RouterId, SimError, Tos};
