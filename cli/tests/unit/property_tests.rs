//! Property-based tests for synthesis invariants.
//!
//! Every zone count, VPC size and region the configuration accepts must
//! synthesize into a template that passes every reachability check.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use isovpc_cli::domain::config::{IsovpcConfig, validate_config_key, validate_config_value};
use isovpc_cli::domain::endpoint::Region;
use isovpc_cli::domain::reachability::analyze;
use isovpc_cli::domain::stack::StackSpec;
use isovpc_common::{Expr, ResourceType, VpcEndpointProperties};

fn region() -> impl Strategy<Value = Region> {
    prop_oneof![
        Just(Region::Agnostic),
        prop::sample::select(vec![
            "us-east-1",
            "us-west-2",
            "eu-west-1",
            "eu-central-1",
            "ap-northeast-1",
            "sa-east-1",
            "us-gov-west-1",
        ])
        .prop_map(|r| Region::Known(r.to_string())),
    ]
}

fn config(prefix: u8, zones: u8, second_octet: u8) -> IsovpcConfig {
    let mut config = IsovpcConfig::default();
    config.network.cidr = format!("10.{second_octet}.0.0/{prefix}");
    config.network.max_azs = zones;
    config
}

proptest! {
    /// Every accepted layout passes every check.
    #[test]
    fn prop_synthesized_template_passes_all_checks(
        prefix in 16u8..=24,
        zones in 2u8..=6,
        second_octet in 0u8..=255,
        region in region(),
    ) {
        let spec = StackSpec::from_config(&config(prefix, zones, second_octet), region.clone())
            .unwrap();
        let template = spec.synthesize().unwrap();
        let report = analyze(&template, &region).unwrap();
        prop_assert!(report.passed(), "{:?}", report.collect_issues());
    }

    /// No internet-facing resource ever appears.
    #[test]
    fn prop_no_gateways(zones in 2u8..=6, region in region()) {
        let spec = StackSpec::from_config(&config(16, zones, 0), region).unwrap();
        let template = spec.synthesize().unwrap();
        for kind in [
            ResourceType::InternetGateway,
            ResourceType::NatGateway,
            ResourceType::VpcGatewayAttachment,
            ResourceType::Route,
        ] {
            prop_assert_eq!(template.resources_of(&kind).count(), 0);
        }
        prop_assert_eq!(template.resources_of(&ResourceType::Subnet).count(), usize::from(zones));
    }

    /// Known regions are baked into literal service names.
    #[test]
    fn prop_known_region_service_names(region in region()) {
        let template = StackSpec::from_config(&IsovpcConfig::default(), region.clone())
            .unwrap()
            .synthesize()
            .unwrap();
        let endpoints = template
            .typed::<VpcEndpointProperties>(&ResourceType::VpcEndpoint)
            .unwrap();
        prop_assert_eq!(endpoints.len(), 3);
        for (_, props) in endpoints {
            match (&region, &props.service_name) {
                (Region::Known(r), Expr::Literal(name)) => {
                    let prefix = format!("com.amazonaws.{r}.");
                    prop_assert!(name.starts_with(&prefix));
                }
                (Region::Agnostic, Expr::Join { .. }) => {}
                (r, name) => prop_assert!(false, "{r:?} produced {name:?}"),
            }
        }
    }

    /// Synthesis is deterministic.
    #[test]
    fn prop_synthesis_is_deterministic(zones in 2u8..=6, region in region()) {
        let spec = StackSpec::from_config(&config(18, zones, 1), region).unwrap();
        prop_assert_eq!(spec.synthesize().unwrap(), spec.synthesize().unwrap());
    }

    /// Arbitrary keys (not in whitelist) are rejected.
    #[test]
    fn prop_arbitrary_keys_rejected(key in "[a-z]{1,12}\\.[a-z_]{1,12}") {
        let known = [
            "stack.name", "stack.region", "network.cidr",
            "network.max_azs", "instance.type", "instance.image",
        ];
        if !known.contains(&key.as_str()) {
            prop_assert!(validate_config_key(&key).is_err(), "accepted invalid key: {key}");
        }
    }

    /// Zone counts outside 2..=6 are rejected.
    #[test]
    fn prop_zone_count_bounds(n in 0u16..300) {
        let result = validate_config_value("network.max_azs", &n.to_string());
        prop_assert_eq!(result.is_ok(), (2..=6).contains(&n));
    }
}
