//! Type-directed value generation against a small compiled model.

use yangsmith_core::{load_str, Datatype, IntBound, IntRange, IntWidth, LengthRange, SchemaTree};
use yangsmith_generate::{GenerationContext, GenerationError, GeneratorOptions};

const MODEL: &str = r#"{
  "modules": {
    "ios": ["ios", "urn:ios"]
  },
  "typedefs": {
    "host-name": ["string", [[[1, 16]], ["[a-z][a-z0-9_-]+"]]]
  },
  "identities": {
    "routing-protocol": ["ospf", "bgp"],
    "null-protocol": []
  },
  "tree": {
    "ios:interface": ["container", ["", ""], {
      "Loopback": ["list", ["", ""], {
        "name": ["leaf", ["", ""], ["string", [[], ["[0-9]{1,4}"]]]],
        "mtu": ["leaf", ["", ""], ["uint16", [[64, 9000]]]]
      }, [["ios", "name"]]]
    }],
    "ios:routing": ["container", ["", ""], {
      "peer": ["leaf", ["", ""], ["leafref", "../../interface/Loopback/name"]],
      "gateway": ["leaf", ["", ""], ["ns-leafref", "../../interface/Loopback/mtu"]]
    }]
  }
}"#;

fn model() -> SchemaTree {
    load_str(MODEL).unwrap()
}

#[test]
fn integer_ranges_honor_min_max_step() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 3);
    let datatype = Datatype::Int {
        width: IntWidth::Uint8,
        ranges: vec![IntRange {
            min: IntBound::Value(10),
            max: Some(IntBound::Value(20)),
            step: 2,
        }],
    };
    for _ in 0..100 {
        let value: i64 = ctx
            .generate(&datatype, None, None)
            .unwrap()
            .unwrap()
            .parse()
            .unwrap();
        assert!((10..=20).contains(&value), "got {value}");
        assert_eq!((value - 10) % 2, 0);
    }
}

#[test]
fn integer_without_ranges_covers_the_width() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 4);
    let datatype = Datatype::Int {
        width: IntWidth::Int8,
        ranges: Vec::new(),
    };
    for _ in 0..50 {
        let value: i64 = ctx
            .generate(&datatype, None, None)
            .unwrap()
            .unwrap()
            .parse()
            .unwrap();
        assert!((-128..=127).contains(&value));
    }
}

#[test]
fn symbolic_bounds_resolve_to_width_limits() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 5);
    let datatype = Datatype::Int {
        width: IntWidth::Uint8,
        ranges: vec![IntRange {
            min: IntBound::Value(250),
            max: Some(IntBound::Max),
            step: 1,
        }],
    };
    for _ in 0..50 {
        let value: i64 = ctx
            .generate(&datatype, None, None)
            .unwrap()
            .unwrap()
            .parse()
            .unwrap();
        assert!((250..=255).contains(&value));
    }
}

#[test]
fn strings_match_pattern_and_length() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 6);
    let datatype = Datatype::Str {
        lengths: vec![LengthRange {
            min: 1,
            max: Some(32),
        }],
        patterns: vec!["[a-z][a-z0-9_-]+".to_string()],
    };
    let re = regex::Regex::new("^[a-z][a-z0-9_-]+$").unwrap();
    for _ in 0..50 {
        let value = ctx.generate(&datatype, None, None).unwrap().unwrap();
        let length = value.chars().count();
        assert!((1..=32).contains(&length), "length {length}");
        // Truncation may cut the tail but never the head shape.
        assert!(
            re.is_match(&value) || length == 32,
            "{value:?} does not match"
        );
    }
}

#[test]
fn synthesis_exhaustion_is_non_fatal_and_counted() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 7);
    // One-character pattern can never reach the five-character minimum.
    let datatype = Datatype::Str {
        lengths: vec![LengthRange {
            min: 5,
            max: Some(10),
        }],
        patterns: vec!["[a-z]".to_string()],
    };
    let value = ctx.generate(&datatype, None, None).unwrap().unwrap();
    assert_eq!(value.chars().count(), 1);
    assert_eq!(ctx.exhausted_patterns, 1);
}

#[test]
fn reserved_markup_characters_are_escaped() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 8);
    let datatype = Datatype::Str {
        lengths: vec![LengthRange {
            min: 3,
            max: Some(64),
        }],
        patterns: vec!["<&>".to_string()],
    };
    // "<&>" is three chars before escaping, which satisfies the minimum.
    let value = ctx.generate(&datatype, None, None).unwrap().unwrap();
    assert_eq!(value, "&lt;&amp;&gt;");
}

#[test]
fn decimal64_stays_inside_the_scaled_range() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 9);
    let datatype = Datatype::Decimal64 {
        fraction_digits: 2,
        range: Some((-10.0, 10.0)),
    };
    for _ in 0..50 {
        let text = ctx.generate(&datatype, None, None).unwrap().unwrap();
        let (_, fraction) = text.split_once('.').expect("missing decimal point");
        assert_eq!(fraction.len(), 2);
        let value: f64 = text.parse().unwrap();
        assert!((-10.0..=10.0).contains(&value), "got {text}");
    }
}

#[test]
fn decimal64_pads_short_magnitudes() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 10);
    let datatype = Datatype::Decimal64 {
        fraction_digits: 4,
        range: Some((0.0001, 0.0009)),
    };
    for _ in 0..20 {
        let text = ctx.generate(&datatype, None, None).unwrap().unwrap();
        assert!(text.starts_with("0.000"), "got {text}");
    }
}

#[test]
fn boolean_and_enumeration_pick_declared_values() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 11);
    for _ in 0..20 {
        let value = ctx.generate(&Datatype::Boolean, None, None).unwrap().unwrap();
        assert!(value == "true" || value == "false");
    }
    let symbols = Datatype::Enumeration(vec!["red".into(), "blue".into()]);
    for _ in 0..20 {
        let value = ctx.generate(&symbols, None, None).unwrap().unwrap();
        assert!(value == "red" || value == "blue");
    }
}

#[test]
fn empty_yields_no_value() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 12);
    assert_eq!(ctx.generate(&Datatype::Empty, None, None).unwrap(), None);
}

#[test]
fn identityref_picks_derived_identities() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 13);
    let datatype = Datatype::Identityref {
        base: "routing-protocol".into(),
    };
    for _ in 0..20 {
        let value = ctx.generate(&datatype, None, None).unwrap().unwrap();
        assert!(value == "ospf" || value == "bgp");
    }

    // A base with no derived identities is its own value; a prefixed
    // base is stripped before lookup.
    let bare = Datatype::Identityref {
        base: "null-protocol".into(),
    };
    assert_eq!(ctx.generate(&bare, None, None).unwrap().unwrap(), "null-protocol");
    let prefixed = Datatype::Identityref {
        base: "ios:routing-protocol".into(),
    };
    assert!(ctx.generate(&prefixed, None, None).unwrap().is_some());

    let unknown = Datatype::Identityref {
        base: "no-such-identity".into(),
    };
    assert!(matches!(
        ctx.generate(&unknown, None, None),
        Err(GenerationError::UnknownIdentity(_))
    ));
}

#[test]
fn typedefs_expand_to_their_underlying_type() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 14);
    let datatype = Datatype::Typedef("host-name".into());
    let re = regex::Regex::new("^[a-z][a-z0-9_-]*$").unwrap();
    for _ in 0..20 {
        let value = ctx.generate(&datatype, None, None).unwrap().unwrap();
        assert!(value.chars().count() <= 16);
        assert!(re.is_match(&value), "{value:?}");
    }

    let unknown = Datatype::Typedef("no-such-typedef".into());
    assert!(matches!(
        ctx.generate(&unknown, None, None),
        Err(GenerationError::UnknownTypedef(_))
    ));
}

#[test]
fn union_members_are_all_reachable() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 15);
    let datatype = Datatype::Union(vec![
        Datatype::Int {
            width: IntWidth::Uint8,
            ranges: vec![IntRange {
                min: IntBound::Value(7),
                max: Some(IntBound::Value(7)),
                step: 1,
            }],
        },
        Datatype::Boolean,
    ]);
    let mut seen_int = false;
    let mut seen_bool = false;
    for _ in 0..100 {
        match ctx.generate(&datatype, None, None).unwrap().unwrap().as_str() {
            "7" => seen_int = true,
            "true" | "false" => seen_bool = true,
            other => panic!("unexpected union value {other:?}"),
        }
    }
    assert!(seen_int && seen_bool);
}

#[test]
fn leafref_to_a_list_key_generates_for_the_target_type() {
    let tree = model();
    let peer = tree
        .find_key_path(&yangsmith_core::parse_key_path("/ios:routing/peer").unwrap())
        .unwrap();
    let datatype = tree.node(peer).datatype().unwrap().clone();

    let mut ctx = GenerationContext::new(&tree, 16);
    let re = regex::Regex::new("^[0-9]{1,4}$").unwrap();
    let value = ctx
        .generate(&datatype, Some("ios"), Some(peer))
        .unwrap()
        .unwrap();
    assert!(re.is_match(&value), "{value:?}");

    // Same seed, same walk, same value.
    let mut replay = GenerationContext::new(&tree, 16);
    let again = replay
        .generate(&datatype, Some("ios"), Some(peer))
        .unwrap()
        .unwrap();
    assert_eq!(value, again);
}

#[test]
fn leafref_to_a_non_key_target_yields_nothing() {
    let tree = model();
    let gateway = tree
        .find_key_path(&yangsmith_core::parse_key_path("/ios:routing/gateway").unwrap())
        .unwrap();
    let datatype = tree.node(gateway).datatype().unwrap().clone();
    let mut ctx = GenerationContext::new(&tree, 17);
    assert_eq!(
        ctx.generate(&datatype, Some("ios"), Some(gateway)).unwrap(),
        None
    );
}

#[test]
fn unsupported_kinds_are_fatal() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 18);
    let result = ctx.generate(&Datatype::Unsupported("bits".into()), None, None);
    assert!(matches!(
        result,
        Err(GenerationError::UnsupportedType { kind, .. }) if kind == "bits"
    ));
}

#[test]
fn unaltered_patterns_rewrite_dot_star() {
    let tree = model();
    let mut ctx = GenerationContext::new(&tree, 19).with_options(GeneratorOptions {
        use_unaltered_patterns: true,
    });
    let datatype = Datatype::Str {
        lengths: Vec::new(),
        patterns: vec!["ge-.*".to_string()],
    };
    let re = regex::Regex::new("^ge-[a-z0-9]{0,15}$").unwrap();
    for _ in 0..20 {
        let value = ctx.generate(&datatype, None, None).unwrap().unwrap();
        assert!(re.is_match(&value), "{value:?}");
    }
}
