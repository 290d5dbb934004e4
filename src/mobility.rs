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

//! Per-node 2-D mobility with reflective boundaries.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// Movement direction along one axis. For the y axis, [`Direction::Positive`] is downwards.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Direction {
    /// The axis does not move.
    None,
    /// Towards smaller coordinates.
    Negative,
    /// Towards larger coordinates.
    Positive,
}

/// Mobility state of a single router.
///
/// Each axis independently keeps one of three directions. On every tick, the position is
/// stepped by `velocity` along each moving axis; on reaching an area boundary the position is
/// clamped to the boundary and the direction of that axis is reversed.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MobilityModel {
    direction_x: Direction,
    direction_y: Direction,
    velocity: f64,
}

impl MobilityModel {
    /// Create a mobility model with explicit directions and velocity.
    pub fn new(direction_x: Direction, direction_y: Direction, velocity: f64) -> Self {
        Self {
            direction_x,
            direction_y,
            velocity,
        }
    }

    /// A model that never moves.
    pub fn stationary() -> Self {
        Self::new(Direction::None, Direction::None, 0.0)
    }

    /// Draw directions and velocity from the seeded generator. Each axis picks one of the
    /// three directions uniformly; the velocity is uniform in the configured range.
    pub fn random<R: Rng>(rng: &mut R, cfg: &SimConfig) -> Self {
        let direction_x = Self::random_direction(rng);
        let direction_y = Self::random_direction(rng);
        let velocity = rng.gen_range(cfg.velocity_min..=cfg.velocity_max) as f64;
        Self {
            direction_x,
            direction_y,
            velocity,
        }
    }

    fn random_direction<R: Rng>(rng: &mut R) -> Direction {
        match rng.gen_range(0u8..3) {
            0 => Direction::None,
            1 => Direction::Negative,
            _ => Direction::Positive,
        }
    }

    /// Advance the position by one tick and return the new coordinates.
    pub fn step(&mut self, x: f64, y: f64, area_x: f64, area_y: f64) -> (f64, f64) {
        (self.step_x(x, area_x), self.step_y(y, area_y))
    }

    fn step_x(&mut self, mut x: f64, area_x: f64) -> f64 {
        match self.direction_x {
            Direction::Negative => {
                x -= self.velocity;
                if x <= 0.0 {
                    self.direction_x = Direction::Positive;
                    x = 0.0;
                }
            }
            Direction::Positive => {
                x += self.velocity;
                if x >= area_x {
                    self.direction_x = Direction::Negative;
                    x = area_x;
                }
            }
            Direction::None => {}
        }
        x
    }

    fn step_y(&mut self, mut y: f64, area_y: f64) -> f64 {
        match self.direction_y {
            // downwards is increasing y
            Direction::Positive => {
                y += self.velocity;
                if y >= area_y {
                    self.direction_y = Direction::Negative;
                    y = area_y;
                }
            }
            Direction::Negative => {
                y -= self.velocity;
                if y <= 0.0 {
                    self.direction_y = Direction::Positive;
                    y = 0.0;
                }
            }
            Direction::None => {}
        }
        y
    }
}
