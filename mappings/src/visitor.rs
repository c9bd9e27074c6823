//! Visitor interface for consuming a mapping tree.
//!
//! [`MappingTree::accept`] drives a [`MappingVisitor`]: namespaces first, then
//! each class followed by its fields and methods, then [`MappingVisitor::visit_end`].
//! [`TreeBuilder`] is the visitor that rebuilds a tree from such a traversal.

use crate::error::{MappingError, Result};
use crate::model::{MappingTree, MemberKey, MemberKind};

/// Receives a mapping tree one entry at a time.
///
/// Destination name slices are indexed like the `dsts` passed to
/// [`visit_namespaces`](Self::visit_namespaces); `None` marks an unmapped name.
pub trait MappingVisitor {
    /// Declares the namespaces of the traversal.
    ///
    /// # Errors
    ///
    /// Implementations return an error to abort the traversal.
    fn visit_namespaces(&mut self, src: &str, dsts: &[String]) -> Result<()>;

    /// Visits a class; the following members belong to it.
    ///
    /// # Errors
    ///
    /// Implementations return an error to abort the traversal.
    fn visit_class(&mut self, src: &str, dst_names: &[Option<String>]) -> Result<()>;

    /// Visits a field of the last visited class.
    ///
    /// # Errors
    ///
    /// Implementations return an error to abort the traversal.
    fn visit_field(&mut self, src: &str, desc: &str, dst_names: &[Option<String>]) -> Result<()>;

    /// Visits a method of the last visited class.
    ///
    /// # Errors
    ///
    /// Implementations return an error to abort the traversal.
    fn visit_method(&mut self, src: &str, desc: &str, dst_names: &[Option<String>])
        -> Result<()>;

    /// Called once after the last entry.
    ///
    /// # Errors
    ///
    /// Implementations return an error to report a failed flush.
    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

impl MappingTree {
    /// Walks the tree in source-name order, feeding `visitor`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the visitor.
    pub fn accept(&self, visitor: &mut dyn MappingVisitor) -> Result<()> {
        visitor.visit_namespaces(self.src_namespace(), self.dst_namespaces())?;
        for (src, class) in self.classes() {
            visitor.visit_class(src, &class.dst_names)?;
            for (key, member) in &class.members {
                match key.kind {
                    MemberKind::Field => visitor.visit_field(&key.name, &key.desc, &member.dst_names)?,
                    MemberKind::Method => {
                        visitor.visit_method(&key.name, &key.desc, &member.dst_names)?
                    }
                }
            }
        }
        visitor.visit_end()
    }
}

/// Visitor that collects a traversal back into a [`MappingTree`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: Option<MappingTree>,
    class: Option<String>,
}

impl TreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected tree.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidVisit`] if no namespaces were visited.
    pub fn finish(self) -> Result<MappingTree> {
        self.tree
            .ok_or(MappingError::InvalidVisit("no namespaces were declared"))
    }

    fn member(&mut self, key: MemberKey, dst_names: &[Option<String>]) -> Result<()> {
        let (Some(tree), Some(owner)) = (self.tree.as_mut(), self.class.as_deref()) else {
            return Err(MappingError::InvalidVisit("member visited outside of a class"));
        };
        tree.add_member(owner, key, dst_names.to_vec());
        Ok(())
    }
}

impl MappingVisitor for TreeBuilder {
    fn visit_namespaces(&mut self, src: &str, dsts: &[String]) -> Result<()> {
        if self.tree.is_some() {
            return Err(MappingError::InvalidVisit("namespaces declared twice"));
        }
        self.tree = Some(MappingTree::new(src, dsts.iter().cloned())?);
        Ok(())
    }

    fn visit_class(&mut self, src: &str, dst_names: &[Option<String>]) -> Result<()> {
        let tree = self
            .tree
            .as_mut()
            .ok_or(MappingError::InvalidVisit("class visited before namespaces"))?;
        tree.add_class(src, dst_names.to_vec());
        self.class = Some(src.to_owned());
        Ok(())
    }

    fn visit_field(&mut self, src: &str, desc: &str, dst_names: &[Option<String>]) -> Result<()> {
        self.member(MemberKey::field(src, desc), dst_names)
    }

    fn visit_method(
        &mut self,
        src: &str,
        desc: &str,
        dst_names: &[Option<String>],
    ) -> Result<()> {
        self.member(MemberKey::method(src, desc), dst_names)
    }
}
