//! Unicast lookup benchmarks.
//!
//! Measures the full-table scan over growing route counts, with and without
//! flow ECMP.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use simnet_routing::{Ipv4Header, Ipv4Stack, Packet, RoutingConfig, StaticRouting, UDP_PROTOCOL};
use simnet_types::{DeviceId, InterfaceAddress, Ipv4Address, Ipv4Mask};
use std::hint::black_box;
use std::rc::Rc;

struct BenchStack;

impl Ipv4Stack for BenchStack {
    fn n_interfaces(&self) -> u32 {
        4
    }

    fn is_up(&self, _interface: u32) -> bool {
        true
    }

    fn is_forwarding(&self, _interface: u32) -> bool {
        true
    }

    fn n_addresses(&self, _interface: u32) -> u32 {
        1
    }

    fn address(&self, interface: u32, _index: u32) -> InterfaceAddress {
        InterfaceAddress::new(
            Ipv4Address::new(192, 168, interface as u8, 1),
            Ipv4Mask::from_prefix_len(24),
        )
    }

    fn net_device(&self, interface: u32) -> DeviceId {
        DeviceId::new(interface)
    }

    fn interface_for_device(&self, device: DeviceId) -> Option<u32> {
        (device.index() < 4).then_some(device.index())
    }
}

fn populated_engine(config: RoutingConfig, routes: u32) -> StaticRouting {
    let mut routing = StaticRouting::with_seed(config, 1);
    routing.set_ipv4(Rc::new(BenchStack));
    for i in 0..routes {
        // Spread prefixes over 10.0.0.0/8 so every lookup scans the table.
        let network = Ipv4Address::new(10, (i >> 8) as u8, (i & 0xff) as u8, 0);
        routing.add_network_route(network, Ipv4Mask::from_prefix_len(24), i % 4, i % 3);
    }
    routing.set_default_route(Ipv4Address::new(192, 168, 0, 254), 0, 10);
    routing
}

fn bench_lookup_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("unicast_lookup");
    let header = Ipv4Header::new(
        Ipv4Address::new(192, 168, 0, 1),
        Ipv4Address::new(10, 1, 7, 9),
        UDP_PROTOCOL,
    );
    let packet = Packet::from_transport_ports(40000, 80);

    for routes in [16u32, 256, 4096] {
        group.throughput(Throughput::Elements(1));
        let mut routing = populated_engine(RoutingConfig::default(), routes);
        group.bench_with_input(BenchmarkId::new("first_match", routes), &routes, |b, _| {
            b.iter(|| {
                let (route, errno) = routing.route_output(&packet, &header, None);
                black_box((route, errno));
            });
        });
    }
    group.finish();
}

fn bench_flow_ecmp(c: &mut Criterion) {
    let config = RoutingConfig {
        random_ecmp_routing: false,
        flow_ecmp_routing: true,
    };
    let mut routing = populated_engine(config, 256);
    // Two equal-cost copies of the target prefix to force tie-breaking.
    routing.add_network_route(
        Ipv4Address::new(10, 1, 7, 0),
        Ipv4Mask::from_prefix_len(24),
        2,
        0,
    );
    routing.add_network_route(
        Ipv4Address::new(10, 1, 7, 0),
        Ipv4Mask::from_prefix_len(24),
        3,
        0,
    );

    let header = Ipv4Header::new(
        Ipv4Address::new(192, 168, 0, 1),
        Ipv4Address::new(10, 1, 7, 9),
        UDP_PROTOCOL,
    );
    let packet = Packet::from_transport_ports(40000, 80);

    c.bench_function("unicast_lookup/flow_ecmp", |b| {
        b.iter(|| {
            let (route, errno) = routing.route_output(&packet, &header, None);
            black_box((route, errno));
        });
    });
}

criterion_group!(benches, bench_lookup_scaling, bench_flow_ecmp);
criterion_main!(benches);
