//! Pure tree-to-tree transforms.
//!
//! Every transform borrows its input and returns a new [`MappingTree`](crate::MappingTree):
//! - [`switch_source`] re-roots a tree onto another namespace
//! - [`merge_namespace`] imports a namespace from a second tree through a join namespace
//! - [`reorder_dst`] reorders or projects the destination namespaces
//! - [`merge_trees`] unions two trees that share their namespaces

pub mod merge;
pub mod reorder;
pub mod switch;

pub use merge::merge_trees;
pub use reorder::{merge_namespace, reorder_dst};
pub use switch::{switch_source, SwitchMode};
