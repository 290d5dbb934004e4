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

//! Module to test the forwarding-table computation (unit tests)

use maplit::btreemap;
use ordered_float::NotNan;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::config::SimConfig;
use crate::logfile::RouterLog;
use crate::mobility::MobilityModel;
use crate::packet::RoutingPacket;
use crate::router::Router;
use crate::types::InterfaceProfile;

fn router(id: u32, profiles: &[InterfaceProfile]) -> Router {
    let cfg = SimConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    Router::new(
        format!("r{id}"),
        RouterId::from(id),
        "10.0.0.0/24".parse().unwrap(),
        (0.0, 0.0),
        MobilityModel::stationary(),
        profiles,
        RouterLog::memory(),
        &cfg,
        &mut rng,
    )
}

fn adv(src: RouterId, seq: u32, prefix: &str, routing_paths: Fib) -> RoutingPacket {
    RoutingPacket {
        router_id: src,
        sequence_no: seq,
        networks: vec![prefix.parse().unwrap()],
        routing_paths,
    }
}

/// A direct entry the way a neighbor would advertise it.
fn advertised_entry(dest: RouterId, owner: RouterId, pt: &str, weight: f64, prefix: &str) -> FibEntry {
    FibEntry {
        next_hop: dest,
        interface: pt.into(),
        full_path: vec![dest, owner],
        networks: vec![prefix.parse().unwrap()],
        links: vec![RouteLink {
            a: owner,
            b: dest,
            weight: NotNan::new(weight).unwrap(),
        }],
    }
}

#[test]
fn direct_entry_for_single_neighbor() {
    let profiles = vec![InterfaceProfile::new("wifi00", 200, 5_000, 10)];
    let a = RouterId::from(0);
    let b = RouterId::from(1);
    let mut r = router(0, &profiles);

    r.handle_route_packet(b, &"wifi00".into(), adv(b, 0, "10.0.2.0/24", Fib::default()));

    for tos in Tos::ALL {
        let entry = &r.fib().table(tos)[&b];
        assert_eq!(entry.next_hop, b);
        assert_eq!(entry.full_path, vec![b, a]);
        assert_eq!(entry.interface, "wifi00".into());
        assert_eq!(entry.networks, vec!["10.0.2.0/24".parse().unwrap()]);
    }
}

#[test]
fn compression_diverges_per_metric() {
    // wifi has the higher bandwidth, tetra the lower loss
    let profiles = vec![
        InterfaceProfile::new("wifi00", 200, 5_000, 10),
        InterfaceProfile::new("tetra00", 300, 1_000, 2),
    ];
    let b = RouterId::from(1);
    let mut r = router(0, &profiles);

    r.handle_route_packet(b, &"wifi00".into(), adv(b, 0, "10.0.2.0/24", Fib::default()));
    r.handle_route_packet(b, &"tetra00".into(), adv(b, 0, "10.0.2.0/24", Fib::default()));

    assert_eq!(r.fib().low_loss[&b].interface, "tetra00".into());
    assert_eq!(r.fib().high_bandwidth[&b].interface, "wifi00".into());
    assert_eq!(*r.fib().low_loss[&b].links[0].weight, 2.0);
    assert_eq!(*r.fib().high_bandwidth[&b].links[0].weight, 5_000.0);
}

#[test]
fn compression_ties_keep_the_first_interface() {
    let profiles = vec![
        InterfaceProfile::new("wifi00", 200, 5_000, 10),
        InterfaceProfile::new("wifi01", 200, 5_000, 10),
    ];
    let b = RouterId::from(1);
    let mut r = router(0, &profiles);

    r.handle_route_packet(b, &"wifi01".into(), adv(b, 0, "10.0.2.0/24", Fib::default()));
    r.handle_route_packet(b, &"wifi00".into(), adv(b, 0, "10.0.2.0/24", Fib::default()));

    assert_eq!(r.fib().low_loss[&b].interface, "wifi00".into());
    assert_eq!(r.fib().high_bandwidth[&b].interface, "wifi00".into());
}

#[test]
fn remote_route_through_middle_router() {
    let profiles = vec![InterfaceProfile::new("wifi00", 200, 5_000, 10)];
    let a = RouterId::from(0);
    let b = RouterId::from(1);
    let c = RouterId::from(2);
    let mut r = router(0, &profiles);

    // the middle router advertises direct routes towards both ends
    let b_paths = Fib {
        low_loss: btreemap! {
            a => advertised_entry(a, b, "wifi00", 10.0, "10.0.1.0/24"),
            c => advertised_entry(c, b, "wifi00", 10.0, "10.0.3.0/24"),
        },
        high_bandwidth: btreemap! {
            a => advertised_entry(a, b, "wifi00", 5_000.0, "10.0.1.0/24"),
            c => advertised_entry(c, b, "wifi00", 5_000.0, "10.0.3.0/24"),
        },
    };
    r.handle_route_packet(b, &"wifi00".into(), adv(b, 0, "10.0.2.0/24", b_paths));

    for tos in Tos::ALL {
        let entry = &r.fib().table(tos)[&c];
        assert_eq!(entry.next_hop, b);
        assert_eq!(entry.full_path, vec![c, b, a]);
        assert_eq!(entry.interface, "wifi00".into());
        assert_eq!(entry.networks, vec!["10.0.3.0/24".parse().unwrap()]);
        assert_eq!(entry.links.len(), 2);
    }
}

#[test]
fn advertised_paths_through_self_are_skipped() {
    let profiles = vec![InterfaceProfile::new("wifi00", 200, 5_000, 10)];
    let a = RouterId::from(0);
    let b = RouterId::from(1);
    let d = RouterId::from(3);
    let mut r = router(0, &profiles);

    // the neighbor only knows the route through us
    let looped = FibEntry {
        next_hop: a,
        interface: "wifi00".into(),
        full_path: vec![d, a, b],
        networks: vec!["10.0.4.0/24".parse().unwrap()],
        links: vec![
            RouteLink {
                a,
                b: d,
                weight: NotNan::new(10.0).unwrap(),
            },
            RouteLink {
                a: b,
                b: a,
                weight: NotNan::new(10.0).unwrap(),
            },
        ],
    };
    let b_paths = Fib {
        low_loss: btreemap! { d => looped.clone() },
        high_bandwidth: btreemap! { d => looped },
    };
    r.handle_route_packet(b, &"wifi00".into(), adv(b, 0, "10.0.2.0/24", b_paths));

    for tos in Tos::ALL {
        assert!(!r.fib().table(tos).contains_key(&d));
    }
}

#[test]
fn unreachable_destinations_are_absent() {
    let profiles = vec![InterfaceProfile::new("wifi00", 200, 5_000, 10)];
    let b = RouterId::from(1);
    let d = RouterId::from(3);
    let x = RouterId::from(4);
    let mut r = router(0, &profiles);

    // an advertised path that does not connect to anything we can reach
    let dangling = FibEntry {
        next_hop: x,
        interface: "wifi00".into(),
        full_path: vec![d, x],
        networks: vec!["10.0.4.0/24".parse().unwrap()],
        links: vec![RouteLink {
            a: x,
            b: d,
            weight: NotNan::new(10.0).unwrap(),
        }],
    };
    let b_paths = Fib {
        low_loss: btreemap! { d => dangling.clone() },
        high_bandwidth: btreemap! { d => dangling },
    };
    r.handle_route_packet(b, &"wifi00".into(), adv(b, 0, "10.0.2.0/24", b_paths));

    for tos in Tos::ALL {
        assert!(r.fib().table(tos).contains_key(&b));
        assert!(!r.fib().table(tos).contains_key(&d));
    }
}

#[test]
fn widest_path_maximizes_the_bottleneck() {
    // b is reachable on wifi (high bandwidth, high loss), c on tetra (low bandwidth, low
    // loss). Both advertise a route towards d.
    let profiles = vec![
        InterfaceProfile::new("wifi00", 200, 10, 10),
        InterfaceProfile::new("tetra00", 300, 100, 1),
    ];
    let a = RouterId::from(0);
    let b = RouterId::from(1);
    let c = RouterId::from(2);
    let d = RouterId::from(3);
    let mut r = router(0, &profiles);

    let b_paths = Fib {
        low_loss: btreemap! { d => advertised_entry(d, b, "wifi00", 1.0, "10.0.4.0/24") },
        high_bandwidth: btreemap! { d => advertised_entry(d, b, "wifi00", 100.0, "10.0.4.0/24") },
    };
    let c_paths = Fib {
        low_loss: btreemap! { d => advertised_entry(d, c, "tetra00", 1.0, "10.0.4.0/24") },
        high_bandwidth: btreemap! { d => advertised_entry(d, c, "tetra00", 5.0, "10.0.4.0/24") },
    };
    r.handle_route_packet(b, &"wifi00".into(), adv(b, 0, "10.0.2.0/24", b_paths));
    r.handle_route_packet(c, &"tetra00".into(), adv(c, 0, "10.0.3.0/24", c_paths));

    // bottleneck via b: min(10, 100) = 10, via c: min(100, 5) = 5
    assert_eq!(r.fib().high_bandwidth[&d].full_path, vec![d, b, a]);
    // loss via b: 10 + 1 = 11, via c: 1 + 1 = 2
    assert_eq!(r.fib().low_loss[&d].full_path, vec![d, c, a]);
}

#[test]
fn recomputation_is_idempotent() {
    let profiles = vec![
        InterfaceProfile::new("wifi00", 200, 5_000, 10),
        InterfaceProfile::new("tetra00", 300, 1_000, 2),
    ];
    let b = RouterId::from(1);
    let c = RouterId::from(2);
    let mut r = router(0, &profiles);

    let b_paths = Fib {
        low_loss: btreemap! { c => advertised_entry(c, b, "tetra00", 2.0, "10.0.3.0/24") },
        high_bandwidth: btreemap! { c => advertised_entry(c, b, "wifi00", 5_000.0, "10.0.3.0/24") },
    };
    r.handle_route_packet(b, &"wifi00".into(), adv(b, 0, "10.0.2.0/24", b_paths));
    r.handle_route_packet(c, &"tetra00".into(), adv(c, 0, "10.0.3.0/24", Fib::default()));

    let first = compute(&r);
    let second = compute(&r);
    assert_eq!(first, second);
    assert_eq!(&first, r.fib());
}
