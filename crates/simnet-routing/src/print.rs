//! `route -n`-style routing table output.

use crate::protocol::StaticRouting;
use std::fmt;

impl StaticRouting {
    /// Writes the unicast routing table in the format of `route -n`.
    ///
    /// Nothing is written when the table is empty. The interface column shows
    /// the device's registered name when the simulator's name registry knows
    /// it, and the bare interface index otherwise.
    pub fn print_routing_table(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        if self.n_routes() == 0 {
            return Ok(());
        }
        let ipv4 = self.stack();
        writeln!(
            out,
            "Destination     Gateway         Genmask         Flags Metric Ref    Use Iface"
        )?;
        for j in 0..self.n_routes() {
            let route = self.route(j);
            let mut flags = String::from("U");
            if route.is_host() {
                flags.push_str("HS");
            } else if route.is_gateway() {
                flags.push_str("GS");
            }
            write!(
                out,
                "{:<16}{:<16}{:<16}{:<6}{:<7}",
                route.dest_network.to_string(),
                route.gateway.to_string(),
                route.dest_mask.to_string(),
                flags,
                self.metric(j),
            )?;
            // Ref and Use counters are not tracked.
            write!(out, "-      ")?;
            write!(out, "-   ")?;
            let device = ipv4.net_device(route.interface);
            match ipv4.device_name(device) {
                Some(name) => writeln!(out, "{}", name)?,
                None => writeln!(out, "{}", route.interface)?,
            }
        }
        Ok(())
    }
}
