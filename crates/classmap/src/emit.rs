//! Drives a [`DiagramSink`] from a [`DeclaredIndex`].

use std::io;

use log::debug;

use crate::{
    export::DiagramSink,
    index::DeclaredIndex,
    progress::ProgressSink,
    resolve::RelationshipResolver,
    statement::Declaration,
};

/// Streams the whole diagram for `index` into `sink`.
///
/// Every type is declared first, package by package in index order. The
/// inheritance, nesting and association edges follow, in that order, and the
/// sink is finished last.
///
/// # Errors
///
/// Returns the first I/O error reported by `sink`.
///
/// # Examples
///
/// ```
/// use classmap::{
///     emit, export::StatementCollector, index::DeclaredIndex, progress::NoProgress,
/// };
/// use classmap_core::declaration::{CompilationUnit, TypeDecl};
///
/// let units = vec![CompilationUnit::new("p")
///     .with_type(TypeDecl::class("A").with_nested(TypeDecl::class("B")))];
/// let index = DeclaredIndex::build(&units).unwrap();
///
/// let mut collector = StatementCollector::new();
/// emit(&index, &mut collector, &mut NoProgress).unwrap();
///
/// assert_eq!(collector.declarations().count(), 2);
/// assert_eq!(collector.relationships().count(), 1);
/// assert!(collector.is_finished());
/// ```
pub fn emit(
    index: &DeclaredIndex<'_>,
    sink: &mut dyn DiagramSink,
    progress: &mut dyn ProgressSink,
) -> io::Result<()> {
    for (package, fqn, decl) in index.iter() {
        sink.declare(&Declaration::describe(index, package, fqn, decl))?;
    }

    let relationships = RelationshipResolver::new(index).resolve_with(progress);
    for relationship in &relationships {
        sink.relate(relationship)?;
    }

    debug!(
        declarations = index.len(),
        relationships = relationships.len();
        "Statement stream emitted"
    );
    sink.finish()
}
