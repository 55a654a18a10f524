//! Override tables consulted ahead of generic datatype dispatch.
//!
//! Three tables with a fixed precedence: key-path overrides (exact tree
//! location of a list key) beat pattern overrides (exact pattern text),
//! which beat typedef overrides (typedef or vendor type name). The stock
//! set produces plausible network-flavored values (addresses, interface
//! numbers, ACL expressions) instead of raw pattern noise; the
//! `use_unaltered_patterns` option bypasses all three.

use std::collections::HashMap;

use rand::{Rng, RngCore};
use yangsmith_core::Datatype;

use crate::errors::GenerationError;
use crate::xeger;

/// A registered generator. Receives the datatype it replaces and the
/// run's random source.
pub type OverrideFn =
    Box<dyn Fn(&Datatype, &mut dyn RngCore) -> Result<String, GenerationError> + Send + Sync>;

#[derive(Default)]
pub struct OverrideTables {
    keypaths: HashMap<Vec<String>, OverrideFn>,
    patterns: HashMap<String, OverrideFn>,
    typedefs: HashMap<String, OverrideFn>,
}

impl OverrideTables {
    /// No overrides at all; every leaf goes through generic dispatch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table set.
    pub fn stock() -> Self {
        let mut tables = Self::default();

        tables.set_typedef("inet:ipv4-address", Box::new(|_, rng| Ok(ipv4(rng))));
        tables.set_typedef("inet:host", Box::new(|_, rng| Ok(ipv4(rng))));
        tables.set_typedef("ios:ipv4-prefix", Box::new(|_, rng| Ok(ipv4_prefix(rng))));
        tables.set_typedef("inet:ipv6-address", Box::new(|_, rng| Ok(ipv6(rng))));
        tables.set_typedef("ios-ipv6-address", Box::new(|_, rng| Ok(ipv6(rng))));
        tables.set_typedef("ipv6-prefix", Box::new(|_, rng| Ok(ipv6_prefix(rng))));
        tables.set_typedef("ios:ipv6-prefix", Box::new(|_, rng| Ok(ipv6_prefix(rng))));
        tables.set_typedef("rd-type", Box::new(|_, rng| Ok(route_distinguisher(rng))));
        tables.set_typedef("asn-ip-type", Box::new(|_, rng| Ok(route_distinguisher(rng))));
        tables.set_typedef("aaa-authentication-name-type", synth("(default)|([a-z_]{5,15})"));
        tables.set_typedef("aaa-authorization-name-type", synth("(default)|([a-z_]{5,15})"));

        for interface in [
            "Port-channel",
            "Serial",
            "Cable",
            "Modular-Cable",
            "Wideband-Cable",
            "Cellular",
            "Embedded-Service-Engine",
        ] {
            tables.set_keypath(
                &format!("/interface/{interface}"),
                Box::new(|_, rng| Ok(interface_number(rng))),
            );
        }
        tables.set_keypath(
            "/interface/Port-channel-subinterface/Serial",
            Box::new(|_, rng| Ok(subinterface_number(rng))),
        );
        tables.set_keypath(
            "/interface/Serial-subinterface/Serial",
            Box::new(|_, rng| Ok(subinterface_number(rng))),
        );
        for interface in ["Ethernet", "FastEthernet", "TenGigabitEthernet"] {
            tables.set_keypath(
                &format!("/interface/{interface}"),
                Box::new(|_, rng| Ok(ethernet_slot(rng))),
            );
        }
        tables.set_keypath(
            "/ip/ftp/password/password-container/password",
            synth("[a-z][a-z0-9_-]+"),
        );
        tables.set_keypath("/ip/prefix-list/prefixes", synth("[a-z][a-z0-9_-]+"));

        // Community-set expressions are too entangled for synthesis to
        // produce readable values; a fixed well-known member is enough.
        tables.set_pattern(
            "((internet)|(local-AS)|(no-advertise)|(no-export)|(\\d+:\\d+)|(\\d+))( (internet)|\
             (local-AS)|(no-advertise)|(no-export)|(\\d+:\\d+)|(\\d+))*",
            Box::new(|_, _| Ok("internet".to_string())),
        );
        tables.set_pattern(
            "((internet)|(local\\-AS)|(no\\-advertise)|(no\\-export)|(\\d+:\\d+)|(\\d+))\
             ( (internet)|(local\\-AS)|(no\\-advertise)|(no\\-export)|(\\d+:\\d+)|(\\d+))*",
            Box::new(|_, _| Ok("internet".to_string())),
        );
        tables.set_pattern(
            "(permit.*)|(deny.*)|(remark.*)",
            synth("(permit|deny|remark) [a-z ]{5,15}"),
        );
        tables.set_pattern("[a-fA-F0-9].*", synth("[a-fA-F0-9]*"));
        tables.set_pattern(
            "(permit .*)|(deny .*)|(remark .*)|([0-9]+.*)|(dynamic .*)|(evaluate .*)",
            synth(
                "(permit [a-z ]{5,15})|(deny [a-z ]{5,15})|(remark [a-z ]{5,15})|([0-9]+)|\
                 (dynamic [a-z ]{5,15})|(evaluate [a-z ]{5,15})",
            ),
        );
        tables.set_pattern(
            "(permit.*)|(deny.*)|(remark.*)|(dynamic.*)",
            synth(
                "(permit [a-z ]{5,15})|(deny [a-z ]{5,15})|(remark [a-z ]{5,15})|([0-9]+)|\
                 (dynamic [a-z ]{5,15})",
            ),
        );
        tables.set_pattern("[A-Za-z0-9][^:.]*", synth("[a-z][a-z0-9_-]+"));

        tables
    }

    /// Register a generator for the list scope at `/a/b/c` (bare names).
    pub fn set_keypath(&mut self, path: &str, generator: OverrideFn) {
        let segments = path
            .trim_start_matches('/')
            .split('/')
            .map(str::to_string)
            .collect();
        self.keypaths.insert(segments, generator);
    }

    /// Register a generator for an exact pattern text.
    pub fn set_pattern(&mut self, pattern: &str, generator: OverrideFn) {
        self.patterns.insert(pattern.to_string(), generator);
    }

    /// Register a generator for a typedef (or vendor type) name.
    pub fn set_typedef(&mut self, name: &str, generator: OverrideFn) {
        self.typedefs.insert(name.to_string(), generator);
    }

    pub fn keypath_override(&self, path: &[String]) -> Option<&OverrideFn> {
        self.keypaths.get(path)
    }

    pub fn pattern_override(&self, pattern: &str) -> Option<&OverrideFn> {
        self.patterns.get(pattern)
    }

    pub fn typedef_override(&self, name: &str) -> Option<&OverrideFn> {
        self.typedefs.get(name)
    }
}

fn synth(pattern: &'static str) -> OverrideFn {
    Box::new(move |_, rng| xeger::synthesize(pattern, rng))
}

fn ipv4(rng: &mut dyn RngCore) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.random_range(0..=255u16),
        rng.random_range(0..=255u16),
        rng.random_range(0..=255u16),
        rng.random_range(0..=255u16),
    )
}

fn ipv4_prefix(rng: &mut dyn RngCore) -> String {
    format!("{}/{}", ipv4(rng), rng.random_range(1..=32u8))
}

fn ipv6(rng: &mut dyn RngCore) -> String {
    format!(
        "{:04X}:{:04X}::{:02X}",
        rng.random_range(0..=65535u32),
        rng.random_range(0..=65535u32),
        rng.random_range(0..=255u32),
    )
}

fn ipv6_prefix(rng: &mut dyn RngCore) -> String {
    format!("{}/{}", ipv6(rng), rng.random_range(0..=127u8))
}

fn route_distinguisher(rng: &mut dyn RngCore) -> String {
    format!(
        "{}:{}",
        rng.random_range(0..=65535u32),
        rng.random_range(0..=255u32)
    )
}

fn interface_number(rng: &mut dyn RngCore) -> String {
    rng.random_range(0..=511u16).to_string()
}

fn subinterface_number(rng: &mut dyn RngCore) -> String {
    format!(
        "{}.{}",
        rng.random_range(0..=511u16),
        rng.random_range(0..=128u16)
    )
}

fn ethernet_slot(rng: &mut dyn RngCore) -> String {
    format!(
        "{}/{}",
        rng.random_range(0..=66u16),
        rng.random_range(0..=128u16)
    )
}
