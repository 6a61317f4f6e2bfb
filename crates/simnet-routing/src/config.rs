//! Engine configuration attributes.

/// Configuration for [`StaticRouting`](crate::StaticRouting).
///
/// The two ECMP modes are mutually exclusive; enabling both is a programming
/// error and aborts on first use.
#[derive(Debug, Clone, Default)]
pub struct RoutingConfig {
    /// Route each packet to a uniformly random entry among equal-cost
    /// candidates.
    pub random_ecmp_routing: bool,
    /// Pin each flow (5-tuple) to one entry among equal-cost candidates.
    pub flow_ecmp_routing: bool,
}

impl RoutingConfig {
    /// Panics if both ECMP modes are enabled.
    pub(crate) fn assert_ecmp_exclusive(&self) {
        assert!(
            !(self.random_ecmp_routing && self.flow_ecmp_routing),
            "RandomEcmpRouting and FlowEcmpRouting are mutually exclusive"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RoutingConfig::default();
        assert!(!config.random_ecmp_routing);
        assert!(!config.flow_ecmp_routing);
        config.assert_ecmp_exclusive();
    }

    #[test]
    #[should_panic(expected = "mutually exclusive")]
    fn test_both_modes_abort() {
        let config = RoutingConfig {
            random_ecmp_routing: true,
            flow_ecmp_routing: true,
        };
        config.assert_ecmp_exclusive();
    }
}
