//! Routing table inspection tool.
//!
//! Builds a three-interface demo node, installs a small static routing
//! table, prints it in `route -n` format, and resolves one destination so
//! the lookup path can be exercised from the command line.

use clap::Parser;
use simnet_routing::{Ipv4Header, Ipv4Stack, Packet, RoutingConfig, StaticRouting, UDP_PROTOCOL};
use simnet_types::{DeviceId, InterfaceAddress, Ipv4Address, Ipv4Mask};
use std::rc::Rc;
use tracing::info;

/// Static routing demo node inspector
#[derive(Parser, Debug)]
#[command(name = "routing-inspect")]
#[command(version, about, long_about = None)]
struct Args {
    /// Destination address to resolve
    #[arg(short, long, default_value = "10.1.2.3")]
    dest: Ipv4Address,

    /// Pick a random equal-cost route per packet
    #[arg(long)]
    random_ecmp: bool,

    /// Pin each flow to one equal-cost route
    #[arg(long)]
    flow_ecmp: bool,

    /// Seed for the ECMP random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Emit the resolved route as JSON
    #[arg(long)]
    json: bool,
}

/// A fixed three-interface host stack for the demo.
struct DemoStack {
    interfaces: Vec<InterfaceAddress>,
}

impl DemoStack {
    fn new() -> Self {
        DemoStack {
            interfaces: vec![
                InterfaceAddress::new(
                    Ipv4Address::new(192, 168, 1, 10),
                    Ipv4Mask::from_prefix_len(24),
                ),
                InterfaceAddress::new(Ipv4Address::new(10, 1, 0, 1), Ipv4Mask::from_prefix_len(16)),
                InterfaceAddress::new(Ipv4Address::new(10, 2, 0, 1), Ipv4Mask::from_prefix_len(16)),
            ],
        }
    }
}

impl Ipv4Stack for DemoStack {
    fn n_interfaces(&self) -> u32 {
        self.interfaces.len() as u32
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
        self.interfaces[interface as usize]
    }

    fn net_device(&self, interface: u32) -> DeviceId {
        DeviceId::new(interface)
    }

    fn interface_for_device(&self, device: DeviceId) -> Option<u32> {
        (device.index() < self.n_interfaces()).then_some(device.index())
    }

    fn device_name(&self, device: DeviceId) -> Option<String> {
        Some(format!("eth{}", device.index()))
    }
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();
    let config = RoutingConfig {
        random_ecmp_routing: args.random_ecmp,
        flow_ecmp_routing: args.flow_ecmp,
    };

    let mut routing = match args.seed {
        Some(seed) => StaticRouting::with_seed(config, seed),
        None => StaticRouting::new(config),
    };
    routing.set_ipv4(Rc::new(DemoStack::new()));

    // Static routes beyond the connected ones synthesized by set_ipv4.
    let gateway = Ipv4Address::new(192, 168, 1, 1);
    routing.set_default_route(gateway, 0, 0);
    routing.add_network_route(
        Ipv4Address::new(10, 0, 0, 0),
        Ipv4Mask::from_prefix_len(8),
        1,
        5,
    );
    routing.add_network_route(
        Ipv4Address::new(10, 0, 0, 0),
        Ipv4Mask::from_prefix_len(8),
        2,
        5,
    );

    let mut rendered = String::new();
    routing
        .print_routing_table(&mut rendered)
        .expect("formatting a String cannot fail");
    print!("{}", rendered);

    let header = Ipv4Header::new(Ipv4Address::new(192, 168, 1, 10), args.dest, UDP_PROTOCOL);
    let packet = Packet::from_transport_ports(49152, 7);
    let (route, errno) = routing.route_output(&packet, &header, None);

    match route {
        Some(route) if args.json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&route).expect("resolved routes serialize")
            );
        }
        Some(route) => {
            info!(destination = %args.dest, source = %route.source, gateway = %route.gateway,
                  device = %route.output_device, "resolved");
        }
        None => {
            info!(destination = %args.dest, ?errno, "no route");
        }
    }
}
