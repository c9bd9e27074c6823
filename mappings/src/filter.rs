//! Synthetic-name filter.
//!
//! Compiler-generated members (`this$0`, `access$000`, `lambda$tick$3`, ...)
//! carry names that are neither readable nor stable, so their destination
//! names are dropped unless the caller asks to keep them.

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::model::MappingTree;

/// Pattern recognising compiler-generated member names.
pub const SYNTHETIC_NAME_PATTERN: &str = r"^(access|this|val\$this|lambda\$.*)\$[0-9]+$";

/// Decides which member destination names are suppressed.
#[derive(Debug, Clone)]
pub struct NameFilter {
    pattern: Regex,
    retain: bool,
}

impl NameFilter {
    /// Creates a filter from a custom pattern.
    ///
    /// With `retain` set the filter suppresses nothing.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidPattern`](crate::MappingError::InvalidPattern)
    /// if the pattern does not compile.
    pub fn new(pattern: &str, retain: bool) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            retain,
        })
    }

    /// Creates a filter using [`SYNTHETIC_NAME_PATTERN`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in pattern fails to compile.
    pub fn synthetic(retain: bool) -> Result<Self> {
        Self::new(SYNTHETIC_NAME_PATTERN, retain)
    }

    /// Whether the filter is bypassed.
    #[must_use]
    pub fn retains_all(&self) -> bool {
        self.retain
    }

    /// Whether `name` should be dropped.
    #[must_use]
    pub fn suppresses(&self, name: &str) -> bool {
        !self.retain && self.pattern.is_match(name)
    }
}

/// Returns a copy of `tree` with every suppressed member destination name removed.
///
/// Class names are left untouched. Source names are never filtered, so a
/// suppressed member stays in the tree and simply becomes unmapped.
#[must_use]
pub fn filter_dst_member_names(tree: &MappingTree, filter: &NameFilter) -> MappingTree {
    let mut out = tree.clone();
    if filter.retains_all() {
        return out;
    }

    let mut suppressed = 0usize;
    let names: Vec<String> = out.classes().map(|(name, _)| name.to_owned()).collect();
    for class in names {
        let entry = out.add_class(class, Vec::new());
        for member in entry.members.values_mut() {
            for slot in member.dst_names.iter_mut() {
                if slot.as_deref().is_some_and(|n| filter.suppresses(n)) {
                    *slot = None;
                    suppressed += 1;
                }
            }
        }
    }
    debug!(suppressed, "filtered synthetic member names");
    out
}
