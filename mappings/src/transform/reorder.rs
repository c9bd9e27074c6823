//! Namespace import and destination reordering.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{MappingError, Result};
use crate::model::{MappingTree, MemberKind};

/// Member identity expressed entirely in the join namespace.
type JoinKey = (String, MemberKind, String, String);

/// Appends namespace `import` of `secondary` to `primary`.
///
/// Every primary entry is looked up in `secondary` by its name in `join` (and,
/// for members, its owner and descriptor in `join`). Names in `join` follow
/// the usual fallback, so an entry left unmapped in `join` is matched by its
/// source name. Primary entries without a match get no `import` name; entries
/// only present in `secondary` are ignored.
///
/// # Errors
///
/// Returns [`MappingError::MissingJoinNamespace`] if either tree lacks `join`,
/// [`MappingError::UnknownNamespace`] if `secondary` lacks `import`, and
/// [`MappingError::DuplicateNamespace`] if `primary` already declares `import`.
pub fn merge_namespace(
    primary: &MappingTree,
    secondary: &MappingTree,
    join: &str,
    import: &str,
) -> Result<MappingTree> {
    let missing = |tree| MappingError::MissingJoinNamespace {
        namespace: join.to_owned(),
        tree,
    };
    primary.namespace_index(join).ok_or_else(|| missing("primary"))?;
    secondary.namespace_index(join).ok_or_else(|| missing("secondary"))?;
    secondary
        .namespace_index(import)
        .ok_or_else(|| MappingError::UnknownNamespace(import.to_owned()))?;

    let mut classes: HashMap<&str, Option<&str>> = HashMap::new();
    let mut members: HashMap<JoinKey, Option<&str>> = HashMap::new();
    for (src, class) in secondary.classes() {
        let Some(owner) = secondary.class_name(src, join) else {
            continue;
        };
        classes.insert(owner, secondary.class_name(src, import));
        for key in class.members.keys() {
            let (Some(name), Some(desc)) = (
                secondary.member_name(src, key, join),
                secondary.member_descriptor_in(&key.desc, join),
            ) else {
                continue;
            };
            members.insert(
                (owner.to_owned(), key.kind, name.to_owned(), desc),
                secondary.member_name(src, key, import),
            );
        }
    }

    let width = primary.dst_namespaces().len();
    let mut dsts = primary.dst_namespaces().to_vec();
    dsts.push(import.to_owned());
    let mut out = MappingTree::new(primary.src_namespace(), dsts)?;

    let mut matched = 0usize;
    for (src, class) in primary.classes() {
        let owner = primary.class_name(src, join).unwrap_or(src);
        let imported = classes.get(owner).copied().flatten();
        matched += usize::from(imported.is_some());
        out.add_class(src, extended(&class.dst_names, width, imported));

        for (key, member) in &class.members {
            let lookup = (
                owner.to_owned(),
                key.kind,
                primary.member_name(src, key, join).unwrap_or(&key.name).to_owned(),
                primary
                    .member_descriptor_in(&key.desc, join)
                    .unwrap_or_else(|| key.desc.clone()),
            );
            let imported = members.get(&lookup).copied().flatten();
            matched += usize::from(imported.is_some());
            out.add_member(src, key.clone(), extended(&member.dst_names, width, imported));
        }
    }

    debug!(
        join,
        import,
        matched,
        total = primary.descriptor_count(),
        "merged namespace"
    );
    Ok(out)
}

/// Rewrites the destination namespaces to exactly `order`.
///
/// `order` may permute the current destinations or leave some out; the
/// source namespace stays first.
///
/// # Errors
///
/// Returns [`MappingError::UnknownNamespace`] for a label that is not a
/// destination of `tree`, and [`MappingError::DuplicateNamespace`] for a
/// label listed twice.
pub fn reorder_dst(tree: &MappingTree, order: &[&str]) -> Result<MappingTree> {
    let slots = order
        .iter()
        .map(|ns| {
            tree.dst_slot(ns)
                .ok_or_else(|| MappingError::UnknownNamespace((*ns).to_owned()))
        })
        .collect::<Result<Vec<usize>>>()?;
    let mut out = MappingTree::new(tree.src_namespace(), order.iter().copied())?;

    let pick = |names: &[Option<String>]| -> Vec<Option<String>> {
        slots.iter().map(|&slot| names.get(slot).cloned().flatten()).collect()
    };
    for (src, class) in tree.classes() {
        out.add_class(src, pick(&class.dst_names));
        for (key, member) in &class.members {
            out.add_member(src, key.clone(), pick(&member.dst_names));
        }
    }
    Ok(out)
}

/// `names` padded to `width` slots, then `extra` appended.
fn extended(names: &[Option<String>], width: usize, extra: Option<&str>) -> Vec<Option<String>> {
    let mut names = names.to_vec();
    names.resize(width, None);
    names.push(extra.map(str::to_owned));
    names
}
