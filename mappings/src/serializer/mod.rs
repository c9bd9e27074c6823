//! Serializers for mapping trees.
//!
//! - **Tiny v2** ([`tiny`]): the tab-separated exchange format, readable and writable
//! - **JSON** ([`json`]): a structured dump for inspection, behind the `serializers` feature

#[cfg(feature = "serializers")]
pub mod json;
pub mod tiny;
