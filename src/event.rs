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

//! Advertisement events and the queue that carries them within a tick.
//!
//! Transmitting routers do not call into their peers. They enqueue one event per receiver,
//! and the simulator drains the queue in FIFO order before the neighbor sweep of the same
//! tick. This keeps the call chain flat while preserving the single-threaded, same-tick
//! reception semantics.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::packet::RoutingPacket;
use crate::types::{PathType, RouterId};

/// One pending advertisement delivery.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AdvertisementEvent {
    /// The transmitting router.
    pub src: RouterId,
    /// The receiving router.
    pub dst: RouterId,
    /// The interface class the advertisement was sent on.
    pub path_type: PathType,
    /// The advertisement itself.
    pub packet: RoutingPacket,
}

/// FIFO queue of advertisement events, drained within the tick that filled it.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventQueue(VecDeque<AdvertisementEvent>);

impl EventQueue {
    /// Create a new empty event queue
    pub fn new() -> Self {
        Self(VecDeque::new())
    }

    /// Enqueue a new event.
    pub fn push(&mut self, event: AdvertisementEvent) {
        self.0.push_back(event)
    }

    /// Enqueue multiple events at once.
    pub fn push_many(&mut self, events: Vec<AdvertisementEvent>) {
        events.into_iter().for_each(|e| self.push(e))
    }

    /// Pop the next event.
    pub fn pop(&mut self) -> Option<AdvertisementEvent> {
        self.0.pop_front()
    }

    /// Peek the next event.
    pub fn peek(&self) -> Option<&AdvertisementEvent> {
        self.0.front()
    }

    /// Get the number of enqueued events
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` if no event is enqueued.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove all events from the queue.
    pub fn clear(&mut self) {
        self.0.clear()
    }
}
