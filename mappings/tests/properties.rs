//! Property-based tests for the parser and the tree transforms.
//!
//! Payloads are generated from a small grammar of classes, fields and methods
//! so every input is well-formed ProGuard text.

use proptest::prelude::*;

use layered_mappings::filter::filter_dst_member_names;
use layered_mappings::proguard::read_str;
use layered_mappings::transform::{merge_namespace, switch_source};
use layered_mappings::{MappingTree, NameFilter, SwitchMode, INTERMEDIARY, NAMED, OFFICIAL};

const TYPES: &[&str] = &["int", "long", "boolean", "java.lang.String", "int[]"];
/// Prefixes that become synthetic names once a numeric suffix is appended.
const SYNTHETIC: &[&str] = &["this$", "access$", "lambda$tick$", "val$this$"];

#[derive(Debug, Clone)]
struct Member {
    ty: &'static str,
    params: Option<Vec<&'static str>>,
    named: String,
}

fn member() -> impl Strategy<Value = Member> {
    (
        prop::sample::select(TYPES),
        prop::option::of(prop::collection::vec(prop::sample::select(TYPES), 0..3)),
        prop_oneof![
            "[a-z]{1,6}",
            prop::sample::select(SYNTHETIC).prop_map(str::to_owned),
        ],
    )
        .prop_map(|(ty, params, named)| Member { ty, params, named })
}

/// Classes `C0..Cn` renamed to `a0..an`; members get an index suffix on both
/// sides so no two lines collide.
fn payload() -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec(prop::collection::vec(member(), 0..5), 1..5).prop_map(|classes| {
        let mut text = String::new();
        let mut lines = 0;
        for (c, members) in classes.iter().enumerate() {
            text.push_str(&format!("net.C{c} -> a{c}:\n"));
            lines += 1;
            for (m, member) in members.iter().enumerate() {
                let name = format!("{}{m}", member.named);
                match &member.params {
                    Some(params) => text.push_str(&format!(
                        "    {m}:{m}:{} {name}({}):{m} -> m{m}\n",
                        member.ty,
                        params.join(",")
                    )),
                    None => text.push_str(&format!("    {} {name} -> f{m}\n", member.ty)),
                }
                lines += 1;
            }
        }
        (text, lines)
    })
}

proptest! {
    /// One descriptor per class or member line, no errors.
    #[test]
    fn parsing_is_total((text, lines) in payload()) {
        let tree = read_str(&text, NAMED, OFFICIAL).unwrap();
        prop_assert_eq!(tree.descriptor_count(), lines);
    }

    /// Switching to `official` and back restores every binding.
    #[test]
    fn strict_switch_round_trips((text, _) in payload()) {
        let tree = read_str(&text, NAMED, OFFICIAL).unwrap();
        let there = switch_source(&tree, OFFICIAL, SwitchMode::Strict).unwrap();
        let back = switch_source(&there, NAMED, SwitchMode::Strict).unwrap();
        prop_assert_eq!(back, tree);
    }

    /// No synthetic name survives filtering, filtering twice changes nothing,
    /// and retaining is a no-op.
    #[test]
    fn synthetic_filter_is_deterministic((text, _) in payload()) {
        let tree = switch_source(&read_str(&text, NAMED, OFFICIAL).unwrap(), OFFICIAL, SwitchMode::Strict).unwrap();

        let dropping = NameFilter::synthetic(false).unwrap();
        let filtered = filter_dst_member_names(&tree, &dropping);
        for (_, class) in filtered.classes() {
            for member in class.members.values() {
                if let Some(name) = member.dst_name(0) {
                    prop_assert!(!dropping.suppresses(name), "{} survived", name);
                }
            }
        }

        let retaining = NameFilter::synthetic(true).unwrap();
        prop_assert_eq!(&filter_dst_member_names(&tree, &retaining), &tree);
        prop_assert_eq!(&filter_dst_member_names(&filtered, &dropping), &filtered);
    }

    /// Entries only present in the secondary tree never enlarge the result.
    #[test]
    fn namespace_merge_is_primary_driven((text, _) in payload(), extra in 0usize..8) {
        let primary = switch_source(&read_str(&text, NAMED, OFFICIAL).unwrap(), OFFICIAL, SwitchMode::Strict).unwrap();
        let mut secondary = MappingTree::new(OFFICIAL, [INTERMEDIARY]).unwrap();
        for i in 0..extra {
            secondary.add_class(format!("x{i}"), vec![Some(format!("class_{i}"))]);
        }
        secondary.add_class("a0", vec![Some("class_000".to_owned())]);

        let merged = merge_namespace(&primary, &secondary, OFFICIAL, INTERMEDIARY).unwrap();
        prop_assert_eq!(merged.descriptor_count(), primary.descriptor_count());
        prop_assert_eq!(merged.class_name("a0", INTERMEDIARY), Some("class_000"));
    }
}
