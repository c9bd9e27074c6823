//! Multi-namespace mapping composition.
//!
//! The `layered-mappings` crate turns Mojang's client and server ProGuard
//! tables plus an intermediary tree into a single `intermediary → named`
//! mapping tree. Every step is a pure transform over [`MappingTree`]s, so each
//! stage can be run and inspected on its own.
//!
//! # Entry Point
//!
//! ```
//! use layered_mappings::{compose, ComposeOptions, MappingTree, MemberKey, TreeBuilder};
//! use layered_mappings::{INTERMEDIARY, NAMED, OFFICIAL};
//!
//! let client = "Foo -> a:\n    void bar() -> b\n";
//! let server = "Baz -> c:\n    void qux() -> d\n";
//!
//! let mut intermediary = MappingTree::new(OFFICIAL, [INTERMEDIARY])?;
//! intermediary.add_class("a", vec![Some("class_001".to_owned())]);
//!
//! let mut sink = TreeBuilder::new();
//! compose(client.as_bytes(), server.as_bytes(), &intermediary, &ComposeOptions::default(), &mut sink)?;
//! let tree = sink.finish()?;
//! assert_eq!(tree.class_name("class_001", NAMED), Some("Foo"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Serialization
//!
//! ```
//! # let tree = layered_mappings::MappingTree::new("official", ["named"])?;
//! let tiny = layered_mappings::serializer::tiny::to_tiny(&tree)?;
//! assert_eq!(tiny, "tiny\t2\t0\tofficial\tnamed\n");
//! # Ok::<(), layered_mappings::MappingError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod compose;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod model;
pub mod proguard;
pub mod serializer;
pub mod source;
pub mod transform;
pub mod visitor;

pub use compose::{
    compose, compose_tree, ComposeError, ComposeOptions, MojangMappingLayer, Stage,
};
pub use error::{MappingError, Result};
pub use filter::{NameFilter, SYNTHETIC_NAME_PATTERN};
pub use model::{
    ClassEntry, MappingTree, MemberEntry, MemberKey, MemberKind, Symbol, INTERMEDIARY, NAMED,
    OFFICIAL,
};
pub use source::{FileSource, MappingSource, StaticSource};
pub use transform::SwitchMode;
pub use visitor::{MappingVisitor, TreeBuilder};
