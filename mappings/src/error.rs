//! Error taxonomy shared by the parser, the tree transforms and the sinks.

use std::io;

/// Errors raised while reading, transforming or emitting a mapping tree.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// A ProGuard payload line conforms to neither the class nor the member grammar.
    #[error("malformed mapping line {line}: {reason}: `{content}`")]
    MalformedMappingLine {
        /// 1-based line number in the payload.
        line: usize,
        /// The offending line, verbatim.
        content: String,
        /// What the parser expected.
        reason: String,
    },

    /// A strict source switch met an entry with no name in the target namespace.
    #[error("cannot switch source to `{namespace}`: {descriptor} has no name in it")]
    UnresolvedNamespaceSwitch {
        /// Namespace the switch was re-rooting onto.
        namespace: String,
        /// The entry missing a binding, rendered as a symbol descriptor.
        descriptor: String,
    },

    /// A namespace merge was attempted without the join namespace in one of the trees.
    #[error("join namespace `{namespace}` is missing from the {tree} tree")]
    MissingJoinNamespace {
        /// The join namespace label.
        namespace: String,
        /// Which side lacks it (`primary` or `secondary`).
        tree: &'static str,
    },

    /// An input payload or tree could not be obtained from its provider.
    #[error("mapping source `{source_name}` is unavailable")]
    SourceUnavailable {
        /// Human-readable name of the source.
        source_name: String,
        /// Underlying provider failure.
        #[source]
        source: io::Error,
    },

    /// A transform referenced a namespace the tree does not declare.
    #[error("namespace `{0}` is not declared by the tree")]
    UnknownNamespace(String),

    /// A namespace label would appear twice in one tree.
    #[error("namespace `{0}` is declared more than once")]
    DuplicateNamespace(String),

    /// A Tiny v2 document does not follow the format.
    #[error("malformed tiny mappings at line {line}: {reason}")]
    MalformedTiny {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// A deserialized tree breaks the shape every tree keeps.
    #[error("inconsistent mapping tree: {0}")]
    InvalidTree(String),

    /// A name cannot be written to a Tiny row without escaping.
    #[error("name `{0}` needs escaping; write with escaped names enabled")]
    UnescapedName(String),

    /// A visitor received calls in an order it cannot make sense of.
    #[error("invalid visit: {0}")]
    InvalidVisit(&'static str),

    /// The name-filter pattern does not compile.
    #[error("invalid name filter pattern")]
    InvalidPattern(#[from] regex::Error),

    /// Reading a payload or writing to a sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T, E = MappingError> = std::result::Result<T, E>;
