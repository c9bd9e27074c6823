//! Union of two trees that declare the same namespaces.

use tracing::debug;

use crate::error::{MappingError, Result};
use crate::model::MappingTree;

/// Unions `base` and `overlay`, keyed on their shared source namespace.
///
/// Entries present in both are merged slot by slot; where both bind a name in
/// the same namespace, the `overlay` name wins. A missing overlay name never
/// erases a base name.
///
/// # Errors
///
/// Returns [`MappingError::MissingJoinNamespace`] if the source namespaces
/// differ and [`MappingError::UnknownNamespace`] if the destination lists do.
pub fn merge_trees(base: &MappingTree, overlay: &MappingTree) -> Result<MappingTree> {
    if base.src_namespace() != overlay.src_namespace() {
        return Err(MappingError::MissingJoinNamespace {
            namespace: base.src_namespace().to_owned(),
            tree: "secondary",
        });
    }
    if overlay.dst_namespaces() != base.dst_namespaces() {
        return Err(MappingError::UnknownNamespace(
            overlay.dst_namespaces().join(", "),
        ));
    }

    let mut out = base.clone();
    let mut conflicts = 0usize;
    for (src, class) in overlay.classes() {
        if let Some(existing) = base.class(src) {
            conflicts += count_conflicts(&existing.dst_names, &class.dst_names);
        }
        out.add_class(src, class.dst_names.clone());
        for (key, member) in &class.members {
            if let Some(existing) = base.member(src, key) {
                conflicts += count_conflicts(&existing.dst_names, &member.dst_names);
            }
            out.add_member(src, key.clone(), member.dst_names.clone());
        }
    }

    debug!(
        classes = out.class_count(),
        members = out.member_count(),
        conflicts,
        "merged mapping trees"
    );
    Ok(out)
}

fn count_conflicts(base: &[Option<String>], overlay: &[Option<String>]) -> usize {
    base.iter()
        .zip(overlay)
        .filter(|(b, o)| matches!((b, o), (Some(b), Some(o)) if b != o))
        .count()
}
