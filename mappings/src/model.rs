//! Core mapping model types.
//!
//! A [`MappingTree`] declares an ordered list of namespaces. The first one is
//! the source namespace: classes are keyed by their source name and members by
//! their source name and source-namespace descriptor. Every other namespace is
//! a destination and holds one optional name per entry.

use std::collections::BTreeMap;
use std::fmt;

use crate::descriptor::remap_descriptor;
use crate::error::{MappingError, Result};

/// The obfuscated names shipped in the game jars.
pub const OFFICIAL: &str = "official";
/// The stable intermediate names that survive across versions.
pub const INTERMEDIARY: &str = "intermediary";
/// The human-readable names.
pub const NAMED: &str = "named";

/// Whether a member is a field or a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemberKind {
    /// A field; its descriptor is a single type.
    Field,
    /// A method; its descriptor is `(params)return`.
    Method,
}

impl MemberKind {
    /// Returns the single-letter tag used by the Tiny format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Field => "f",
            MemberKind::Method => "m",
        }
    }
}

/// Identity of a member inside its owner class, in the tree's source namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberKey {
    /// Field or method.
    pub kind: MemberKind,
    /// Source-namespace name.
    pub name: String,
    /// Source-namespace JVM descriptor.
    pub desc: String,
}

impl MemberKey {
    /// Creates a field key.
    pub fn field(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::Field,
            name: name.into(),
            desc: desc.into(),
        }
    }

    /// Creates a method key.
    pub fn method(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::Method,
            name: name.into(),
            desc: desc.into(),
        }
    }
}

/// A field or method with one optional name per destination namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberEntry {
    /// Destination names, indexed like [`MappingTree::dst_namespaces`].
    pub dst_names: Vec<Option<String>>,
}

/// A class with its destination names and members.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassEntry {
    /// Destination names, indexed like [`MappingTree::dst_namespaces`].
    pub dst_names: Vec<Option<String>>,
    /// Members keyed by source identity.
    #[cfg_attr(feature = "serde", serde(with = "member_list"))]
    pub members: BTreeMap<MemberKey, MemberEntry>,
}

impl ClassEntry {
    /// Returns the name bound in destination slot `slot`, if any.
    #[must_use]
    pub fn dst_name(&self, slot: usize) -> Option<&str> {
        self.dst_names.get(slot).and_then(|n| n.as_deref())
    }
}

impl MemberEntry {
    /// Returns the name bound in destination slot `slot`, if any.
    #[must_use]
    pub fn dst_name(&self, slot: usize) -> Option<&str> {
        self.dst_names.get(slot).and_then(|n| n.as_deref())
    }
}

/// Printable identity of a class or member, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol<'a> {
    /// A class, by source name.
    Class(&'a str),
    /// A member of `owner`.
    Member {
        /// Owner class source name.
        owner: &'a str,
        /// Member key.
        key: &'a MemberKey,
    },
}

impl fmt::Display for Symbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Class(name) => write!(f, "class {name}"),
            Symbol::Member { owner, key } => match key.kind {
                MemberKind::Field => write!(f, "field {owner}.{}:{}", key.name, key.desc),
                MemberKind::Method => write!(f, "method {owner}.{}{}", key.name, key.desc),
            },
        }
    }
}

/// A multi-namespace mapping tree.
///
/// Deserializing checks the same invariants as [`MappingTree::new`] plus one
/// name slot per destination on every entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MappingTree {
    namespaces: Vec<String>,
    classes: BTreeMap<String, ClassEntry>,
}

impl MappingTree {
    /// Creates an empty tree with source namespace `src` and destinations `dsts`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::DuplicateNamespace`] if a label repeats.
    pub fn new<I, S>(src: impl Into<String>, dsts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut namespaces: Vec<String> = vec![src.into()];
        for ns in dsts {
            let ns = ns.into();
            if namespaces.contains(&ns) {
                return Err(MappingError::DuplicateNamespace(ns));
            }
            namespaces.push(ns);
        }
        Ok(Self {
            namespaces,
            classes: BTreeMap::new(),
        })
    }

    /// The source namespace.
    #[must_use]
    pub fn src_namespace(&self) -> &str {
        self.namespaces.first().map_or("", String::as_str)
    }

    /// The destination namespaces, in order.
    #[must_use]
    pub fn dst_namespaces(&self) -> &[String] {
        self.namespaces.get(1..).unwrap_or_default()
    }

    /// All namespaces, source first.
    #[must_use]
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Position of `ns` in [`namespaces`](Self::namespaces); `0` is the source.
    #[must_use]
    pub fn namespace_index(&self, ns: &str) -> Option<usize> {
        self.namespaces.iter().position(|n| n == ns)
    }

    /// Destination slot of `ns`, or `None` for the source or an unknown label.
    #[must_use]
    pub fn dst_slot(&self, ns: &str) -> Option<usize> {
        self.namespace_index(ns).and_then(|i| i.checked_sub(1))
    }

    /// Iterates classes in source-name order.
    pub fn classes(&self) -> impl Iterator<Item = (&str, &ClassEntry)> {
        self.classes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up a class by source name.
    #[must_use]
    pub fn class(&self, src_name: &str) -> Option<&ClassEntry> {
        self.classes.get(src_name)
    }

    /// Looks up a member by owner source name and key.
    #[must_use]
    pub fn member(&self, owner: &str, key: &MemberKey) -> Option<&MemberEntry> {
        self.classes.get(owner).and_then(|c| c.members.get(key))
    }

    /// Number of classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of fields and methods across all classes.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.classes.values().map(|c| c.members.len()).sum()
    }

    /// Number of descriptors (classes plus members).
    #[must_use]
    pub fn descriptor_count(&self) -> usize {
        self.class_count() + self.member_count()
    }

    /// Inserts a class, or updates the names of an existing one.
    ///
    /// `None` entries in `dst_names` never clear a name that is already bound.
    pub fn add_class(
        &mut self,
        src_name: impl Into<String>,
        dst_names: Vec<Option<String>>,
    ) -> &mut ClassEntry {
        let width = self.dst_namespaces().len();
        let entry = self
            .classes
            .entry(src_name.into())
            .or_insert_with(|| ClassEntry {
                dst_names: vec![None; width],
                members: BTreeMap::new(),
            });
        overlay_names(&mut entry.dst_names, dst_names);
        entry
    }

    /// Inserts a member under `owner`, creating the owner without names if needed.
    pub fn add_member(&mut self, owner: &str, key: MemberKey, dst_names: Vec<Option<String>>) {
        let width = self.dst_namespaces().len();
        let class = self.add_class(owner, Vec::new());
        let entry = class.members.entry(key).or_insert_with(|| MemberEntry {
            dst_names: vec![None; width],
        });
        overlay_names(&mut entry.dst_names, dst_names);
    }

    /// Name of class `src_name` in `ns`, falling back to the nearest namespace
    /// before `ns` that binds a name (ultimately the source name).
    ///
    /// Returns `None` when the class or the namespace is unknown.
    #[must_use]
    pub fn class_name(&self, src_name: &str, ns: &str) -> Option<&str> {
        let (key, entry) = self.classes.get_key_value(src_name)?;
        self.resolve(key, &entry.dst_names, ns)
    }

    /// Name of a member in `ns`, with the same fallback as [`class_name`](Self::class_name).
    #[must_use]
    pub fn member_name(&self, owner: &str, key: &MemberKey, ns: &str) -> Option<&str> {
        let (key, entry) = self.classes.get(owner)?.members.get_key_value(key)?;
        self.resolve(&key.name, &entry.dst_names, ns)
    }

    /// Expresses a source-namespace descriptor in `ns`.
    ///
    /// Class references the tree does not know are kept verbatim.
    #[must_use]
    pub fn member_descriptor_in(&self, desc: &str, ns: &str) -> Option<String> {
        let index = self.namespace_index(ns)?;
        if index == 0 {
            return Some(desc.to_owned());
        }
        Some(remap_descriptor(desc, |class| self.class_name(class, ns)))
    }

    fn resolve<'a>(&'a self, src: &'a str, dst: &'a [Option<String>], ns: &str) -> Option<&'a str> {
        let index = self.namespace_index(ns)?;
        (1..=index)
            .rev()
            .find_map(|i| dst.get(i - 1).and_then(|n| n.as_deref()))
            .or(Some(src))
    }
}

#[cfg(feature = "serde")]
impl MappingTree {
    fn from_parts(namespaces: Vec<String>, classes: BTreeMap<String, ClassEntry>) -> Result<Self> {
        let Some((src, dsts)) = namespaces.split_first() else {
            return Err(MappingError::InvalidTree("no namespaces declared".to_owned()));
        };
        let mut tree = Self::new(src.clone(), dsts.iter().cloned())?;
        let width = dsts.len();
        let mismatch = |symbol: Symbol<'_>, found: usize| {
            MappingError::InvalidTree(format!(
                "{symbol} has {found} destination names, expected {width}"
            ))
        };
        for (name, class) in &classes {
            if class.dst_names.len() != width {
                return Err(mismatch(Symbol::Class(name), class.dst_names.len()));
            }
            for (key, member) in &class.members {
                if member.dst_names.len() != width {
                    let symbol = Symbol::Member { owner: name, key };
                    return Err(mismatch(symbol, member.dst_names.len()));
                }
            }
        }
        tree.classes = classes;
        Ok(tree)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for MappingTree {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct RawTree {
            namespaces: Vec<String>,
            classes: BTreeMap<String, ClassEntry>,
        }

        let raw = RawTree::deserialize(deserializer)?;
        Self::from_parts(raw.namespaces, raw.classes).map_err(serde::de::Error::custom)
    }
}

/// Members as a list of `(key, entry)` pairs, since JSON object keys must be strings.
#[cfg(feature = "serde")]
mod member_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::{MemberEntry, MemberKey};

    pub(super) fn serialize<S: Serializer>(
        members: &BTreeMap<MemberKey, MemberEntry>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(members)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<MemberKey, MemberEntry>, D::Error> {
        Vec::<(MemberKey, MemberEntry)>::deserialize(deserializer)
            .map(|pairs| pairs.into_iter().collect())
    }
}

fn overlay_names(target: &mut [Option<String>], names: Vec<Option<String>>) {
    for (slot, name) in target.iter_mut().zip(names) {
        if name.is_some() {
            *slot = name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MappingTree {
        let mut tree = MappingTree::new(OFFICIAL, [INTERMEDIARY, NAMED]).unwrap();
        tree.add_class("a", vec![Some("class_1".into()), Some("Foo".into())]);
        tree.add_class("b", vec![None, Some("Bar".into())]);
        tree.add_member(
            "a",
            MemberKey::method("c", "(Lb;)La;"),
            vec![Some("method_2".into()), None],
        );
        tree
    }

    #[test]
    fn rejects_duplicate_namespaces() {
        let err = MappingTree::new(OFFICIAL, [NAMED, OFFICIAL]).unwrap_err();
        assert!(matches!(err, MappingError::DuplicateNamespace(ns) if ns == OFFICIAL));
    }

    #[test]
    fn counts_descriptors() {
        let tree = sample();
        assert_eq!(tree.class_count(), 2);
        assert_eq!(tree.member_count(), 1);
        assert_eq!(tree.descriptor_count(), 3);
    }

    #[test]
    fn names_fall_back_to_nearest_defined_namespace() {
        let tree = sample();
        assert_eq!(tree.class_name("a", NAMED), Some("Foo"));
        assert_eq!(tree.class_name("b", INTERMEDIARY), Some("b"));
        let key = MemberKey::method("c", "(Lb;)La;");
        assert_eq!(tree.member_name("a", &key, NAMED), Some("method_2"));
        assert_eq!(tree.member_name("a", &key, OFFICIAL), Some("c"));
        assert_eq!(tree.class_name("a", "unknown"), None);
        assert_eq!(tree.class_name("zzz", NAMED), None);
    }

    #[test]
    fn descriptor_is_expressed_per_namespace() {
        let tree = sample();
        assert_eq!(
            tree.member_descriptor_in("(Lb;)La;", NAMED).as_deref(),
            Some("(LBar;)LFoo;")
        );
        assert_eq!(
            tree.member_descriptor_in("(Lb;)La;", INTERMEDIARY).as_deref(),
            Some("(Lb;)Lclass_1;")
        );
    }

    #[test]
    fn add_class_keeps_existing_names_on_none() {
        let mut tree = sample();
        tree.add_class("a", vec![None, Some("Renamed".into())]);
        assert_eq!(tree.class_name("a", INTERMEDIARY), Some("class_1"));
        assert_eq!(tree.class_name("a", NAMED), Some("Renamed"));
    }

    #[cfg(feature = "serializers")]
    #[test]
    fn serde_json_round_trip_keeps_members() {
        let tree = sample();
        let text = serde_json::to_string(&tree).unwrap();
        let back: MappingTree = serde_json::from_str(&text).unwrap();
        assert_eq!(back, tree);
    }

    #[cfg(feature = "serializers")]
    #[test]
    fn deserialize_rejects_inconsistent_trees() {
        let empty = serde_json::from_str::<MappingTree>(r#"{"namespaces":[],"classes":{}}"#);
        assert!(empty.is_err());

        let short_class = r#"{"namespaces":["official","named"],
            "classes":{"a":{"dst_names":[],"members":[]}}}"#;
        assert!(serde_json::from_str::<MappingTree>(short_class).is_err());

        let short_member = r#"{"namespaces":["official","named"],
            "classes":{"a":{"dst_names":["Foo"],"members":[
                [{"kind":"Field","name":"x","desc":"I"},{"dst_names":[]}]
            ]}}}"#;
        assert!(serde_json::from_str::<MappingTree>(short_member).is_err());

        let duplicate = r#"{"namespaces":["official","official"],"classes":{}}"#;
        assert!(serde_json::from_str::<MappingTree>(duplicate).is_err());
    }

    #[test]
    fn symbols_render_for_diagnostics() {
        let key = MemberKey::field("x", "I");
        assert_eq!(Symbol::Class("a").to_string(), "class a");
        assert_eq!(
            Symbol::Member { owner: "a", key: &key }.to_string(),
            "field a.x:I"
        );
    }
}
