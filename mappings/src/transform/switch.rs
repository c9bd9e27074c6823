//! Namespace source switch.
//!
//! Switching `[A, B, C]` onto `C` yields `[C, B, A]`: the new source takes the
//! old source's place, which moves into the slot `C` left behind. Member
//! descriptors are re-expressed in the new source namespace.

use tracing::debug;

use crate::descriptor::remap_descriptor;
use crate::error::{MappingError, Result};
use crate::model::{MappingTree, MemberKey, Symbol};

/// What to do with entries that have no name in the new source namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchMode {
    /// Fail with [`MappingError::UnresolvedNamespaceSwitch`].
    Strict,
    /// Drop the entry; a dropped class takes its members with it.
    Lossy,
}

/// Re-roots `tree` onto `ns`.
///
/// # Errors
///
/// Returns [`MappingError::UnknownNamespace`] if `ns` is not declared, and in
/// [`SwitchMode::Strict`] [`MappingError::UnresolvedNamespaceSwitch`] for the
/// first entry lacking an `ns` name.
pub fn switch_source(tree: &MappingTree, ns: &str, mode: SwitchMode) -> Result<MappingTree> {
    let index = tree
        .namespace_index(ns)
        .ok_or_else(|| MappingError::UnknownNamespace(ns.to_owned()))?;
    if index == 0 {
        return Ok(tree.clone());
    }
    let slot = index - 1;

    let mut dsts: Vec<String> = tree.dst_namespaces().to_vec();
    if let Some(dst) = dsts.get_mut(slot) {
        *dst = tree.src_namespace().to_owned();
    }
    let mut out = MappingTree::new(ns, dsts)?;

    let unresolved = |symbol: Symbol<'_>| MappingError::UnresolvedNamespaceSwitch {
        namespace: ns.to_owned(),
        descriptor: symbol.to_string(),
    };
    let class_in_ns = |class: &str| tree.class(class).and_then(|c| c.dst_name(slot));

    let (mut dropped_classes, mut dropped_members) = (0usize, 0usize);
    for (src, class) in tree.classes() {
        let Some(new_src) = class.dst_name(slot) else {
            match mode {
                SwitchMode::Strict => return Err(unresolved(Symbol::Class(src))),
                SwitchMode::Lossy => {
                    dropped_classes += 1;
                    dropped_members += class.members.len();
                    continue;
                }
            }
        };
        out.add_class(new_src, swapped(&class.dst_names, slot, src));

        for (key, member) in &class.members {
            let Some(new_name) = member.dst_name(slot) else {
                match mode {
                    SwitchMode::Strict => {
                        return Err(unresolved(Symbol::Member { owner: src, key }))
                    }
                    SwitchMode::Lossy => {
                        dropped_members += 1;
                        continue;
                    }
                }
            };
            let new_key = MemberKey {
                kind: key.kind,
                name: new_name.to_owned(),
                desc: remap_descriptor(&key.desc, class_in_ns),
            };
            out.add_member(new_src, new_key, swapped(&member.dst_names, slot, &key.name));
        }
    }

    if dropped_classes + dropped_members > 0 {
        debug!(
            namespace = ns,
            dropped_classes, dropped_members, "lossy source switch dropped unmapped entries"
        );
    }
    Ok(out)
}

fn swapped(names: &[Option<String>], slot: usize, old_src: &str) -> Vec<Option<String>> {
    let mut names = names.to_vec();
    if let Some(name) = names.get_mut(slot) {
        *name = Some(old_src.to_owned());
    }
    names
}
