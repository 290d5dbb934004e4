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

//! End-to-end scenarios on the public simulator interface.

use pretty_assertions::assert_eq;

use super::pfx;
use crate::config::SimConfig;
use crate::forwarding::{DropReason, ForwardOutcome};
use crate::mobility::{Direction, MobilityModel};
use crate::packet::DataPacket;
use crate::sim::Simulator;
use crate::types::{InterfaceProfile, Tos};

fn wifi(range: u32) -> Vec<InterfaceProfile> {
    vec![InterfaceProfile::new("wifi00", range, 1_000, 5)]
}

fn flat_area() -> SimConfig {
    SimConfig {
        area_x: 2_000,
        area_y: 10,
        ..Default::default()
    }
}

/// One advertisement round: every router has certainly transmitted once afterwards.
fn one_round(sim: &Simulator) -> usize {
    sim.config().tx_interval + sim.config().tx_jitter + 1
}

#[test]
fn two_nodes_in_range_learn_direct_routes() {
    let mut sim = Simulator::new(flat_area());
    let a = sim
        .add_router(
            "a",
            pfx("10.0.1.0/24"),
            (0.0, 0.0),
            MobilityModel::stationary(),
            &wifi(500),
        )
        .unwrap();
    let b = sim
        .add_router(
            "b",
            pfx("10.0.2.0/24"),
            (100.0, 0.0),
            MobilityModel::stationary(),
            &wifi(500),
        )
        .unwrap();
    sim.sweep_neighbors();

    for _ in 0..one_round(&sim) {
        sim.step_tick();
    }

    for tos in Tos::ALL {
        let to_b = &sim.get_router(a).unwrap().fib().table(tos)[&b];
        assert_eq!(to_b.next_hop, b);
        assert_eq!(to_b.full_path, vec![b, a]);
        let to_a = &sim.get_router(b).unwrap().fib().table(tos)[&a];
        assert_eq!(to_a.next_hop, a);
        assert_eq!(to_a.full_path, vec![a, b]);
    }
    assert_eq!(sim.active_neighbor_info(), 2);

    let outcome = sim.dispatch(DataPacket::new(a, b, 16, Tos::LowLoss)).unwrap();
    assert_eq!(outcome, ForwardOutcome::Delivered { path: vec![a, b] });
}

#[test]
fn mobile_node_leaves_range_and_expires() {
    let mut sim = Simulator::new(flat_area());
    let a = sim
        .add_router(
            "a",
            pfx("10.0.1.0/24"),
            (0.0, 0.0),
            MobilityModel::stationary(),
            &wifi(500),
        )
        .unwrap();
    let b = sim
        .add_router(
            "b",
            pfx("10.0.2.0/24"),
            (100.0, 0.0),
            MobilityModel::new(Direction::Positive, Direction::None, 1.0),
            &wifi(500),
        )
        .unwrap();
    sim.sweep_neighbors();

    let wifi00 = crate::types::PathType::new("wifi00");

    // b crosses the range boundary at distance 500, i.e. after tick 400
    while sim.tick() < 402 {
        sim.step_tick();
    }
    let ra = sim.get_router(a).unwrap();
    assert!(!ra.interface(&wifi00).unwrap().neighbors().contains(&b));
    // the routes survive until the dead interval fires
    assert!(ra.fib().low_loss.contains_key(&b));
    assert!(ra.rib()[&wifi00].contains_key(&b));

    while sim.tick() < 540 {
        sim.step_tick();
    }
    let ra = sim.get_router(a).unwrap();
    assert!(!ra.rib()[&wifi00].contains_key(&b));
    assert!(!ra.fib().low_loss.contains_key(&b));
    assert!(!ra.fib().high_bandwidth.contains_key(&b));
}

#[test]
fn chain_routes_through_the_middle() {
    let mut sim = Simulator::new(flat_area());
    let a = sim
        .add_router(
            "a",
            pfx("10.0.1.0/24"),
            (0.0, 0.0),
            MobilityModel::stationary(),
            &wifi(200),
        )
        .unwrap();
    let b = sim
        .add_router(
            "b",
            pfx("10.0.2.0/24"),
            (150.0, 0.0),
            MobilityModel::stationary(),
            &wifi(200),
        )
        .unwrap();
    let c = sim
        .add_router(
            "c",
            pfx("10.0.3.0/24"),
            (300.0, 0.0),
            MobilityModel::stationary(),
            &wifi(200),
        )
        .unwrap();
    sim.sweep_neighbors();

    // two advertisement rounds: the middle router learns its neighbors in the first and
    // announces them in the second
    for _ in 0..2 * one_round(&sim) {
        sim.step_tick();
    }

    let entry = &sim.get_router(a).unwrap().fib().low_loss[&c];
    assert_eq!(entry.next_hop, b);
    assert_eq!(entry.full_path, vec![c, b, a]);
    assert_eq!(entry.interface, "wifi00".into());
    assert_eq!(entry.networks, vec![pfx("10.0.3.0/24")]);

    let entry = &sim.get_router(c).unwrap().fib().low_loss[&a];
    assert_eq!(entry.next_hop, b);
    assert_eq!(entry.full_path, vec![a, b, c]);

    let outcome = sim.dispatch(DataPacket::new(a, c, 16, Tos::LowLoss)).unwrap();
    assert_eq!(
        outcome,
        ForwardOutcome::Delivered {
            path: vec![a, b, c]
        }
    );
}

#[test]
fn metric_divergence_selects_different_interfaces() {
    let profiles = vec![
        InterfaceProfile::new("wifi00", 200, 5_000, 10),
        InterfaceProfile::new("tetra00", 300, 1_000, 2),
    ];
    let mut sim = Simulator::new(flat_area());
    let a = sim
        .add_router(
            "a",
            pfx("10.0.1.0/24"),
            (0.0, 0.0),
            MobilityModel::stationary(),
            &profiles,
        )
        .unwrap();
    let b = sim
        .add_router(
            "b",
            pfx("10.0.2.0/24"),
            (150.0, 0.0),
            MobilityModel::stationary(),
            &profiles,
        )
        .unwrap();
    sim.sweep_neighbors();

    for _ in 0..one_round(&sim) {
        sim.step_tick();
    }

    let fib = sim.get_router(a).unwrap().fib();
    assert_eq!(fib.low_loss[&b].interface, "tetra00".into());
    assert_eq!(fib.high_bandwidth[&b].interface, "wifi00".into());
}

#[test]
fn ttl_exhaustion_drops_at_the_first_hop() {
    let mut sim = Simulator::new(flat_area());
    let a = sim
        .add_router(
            "a",
            pfx("10.0.1.0/24"),
            (0.0, 0.0),
            MobilityModel::stationary(),
            &wifi(200),
        )
        .unwrap();
    let b = sim
        .add_router(
            "b",
            pfx("10.0.2.0/24"),
            (150.0, 0.0),
            MobilityModel::stationary(),
            &wifi(200),
        )
        .unwrap();
    let c = sim
        .add_router(
            "c",
            pfx("10.0.3.0/24"),
            (300.0, 0.0),
            MobilityModel::stationary(),
            &wifi(200),
        )
        .unwrap();
    sim.sweep_neighbors();

    for _ in 0..2 * one_round(&sim) {
        sim.step_tick();
    }

    let outcome = sim.dispatch(DataPacket::new(a, c, 1, Tos::LowLoss)).unwrap();
    assert_eq!(
        outcome,
        ForwardOutcome::Dropped {
            path: vec![a, b],
            at: b,
            reason: DropReason::TtlExpired,
        }
    );
}

#[test]
fn missing_route_drops_at_the_source() {
    let mut sim = Simulator::new(flat_area());
    let a = sim
        .add_router(
            "a",
            pfx("10.0.1.0/24"),
            (0.0, 0.0),
            MobilityModel::stationary(),
            &wifi(500),
        )
        .unwrap();
    let b = sim
        .add_router(
            "b",
            pfx("10.0.2.0/24"),
            (1_000.0, 0.0),
            MobilityModel::stationary(),
            &wifi(500),
        )
        .unwrap();
    sim.sweep_neighbors();

    for _ in 0..one_round(&sim) {
        sim.step_tick();
    }

    let outcome = sim
        .dispatch(DataPacket::new(a, b, 16, Tos::HighBandwidth))
        .unwrap();
    assert_eq!(
        outcome,
        ForwardOutcome::Dropped {
            path: vec![a],
            at: a,
            reason: DropReason::NoRoute,
        }
    );
}

#[test]
fn removed_router_ages_out() {
    let mut sim = Simulator::new(flat_area());
    let a = sim
        .add_router(
            "a",
            pfx("10.0.1.0/24"),
            (0.0, 0.0),
            MobilityModel::stationary(),
            &wifi(500),
        )
        .unwrap();
    let b = sim
        .add_router(
            "b",
            pfx("10.0.2.0/24"),
            (100.0, 0.0),
            MobilityModel::stationary(),
            &wifi(500),
        )
        .unwrap();
    sim.sweep_neighbors();

    for _ in 0..one_round(&sim) {
        sim.step_tick();
    }
    assert!(sim.get_router(a).unwrap().fib().low_loss.contains_key(&b));

    sim.remove_router(b).unwrap();
    let deadline = sim.tick() + sim.config().dead_interval() + 2;
    while sim.tick() < deadline {
        sim.step_tick();
    }

    let ra = sim.get_router(a).unwrap();
    assert!(ra.rib().values().all(|entries| entries.is_empty()));
    assert!(ra.fib().is_empty());
    assert_eq!(sim.active_neighbor_info(), 0);
}

#[test]
fn identical_seeds_give_identical_runs() {
    let cfg = SimConfig {
        simulation_time: 200,
        ..Default::default()
    };
    let mut s1 = Simulator::random_topology(cfg.clone(), SimConfig::default_profiles()).unwrap();
    let mut s2 = Simulator::random_topology(cfg, SimConfig::default_profiles()).unwrap();
    s1.run();
    s2.run();

    assert_eq!(s1.snapshot(), s2.snapshot());
    for (r1, r2) in s1.routers().zip(s2.routers()) {
        assert_eq!(r1.fib(), r2.fib());
        assert_eq!(r1.rib(), r2.rib());
    }
}

#[test]
fn snapshots_serialize_for_external_renderers() {
    let mut sim = Simulator::new(flat_area());
    sim.add_router(
        "a",
        pfx("10.0.1.0/24"),
        (10.0, 5.0),
        MobilityModel::stationary(),
        &wifi(500),
    )
    .unwrap();
    sim.sweep_neighbors();
    sim.step_tick();

    let snapshot = sim.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("transmitted_now"));
    assert!(json.contains("wifi00"));
}
