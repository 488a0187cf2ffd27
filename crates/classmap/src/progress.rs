//! Progress reporting for a single classmap run.
//!
//! A [`ProgressSink`] is passed explicitly into the index build and the
//! relationship passes. It lives exactly as long as the run that owns it, so
//! two runs in the same process never share counters.

use classmap_core::{
    declaration::{CompilationUnit, TypeKind},
    fqn::Fqn,
};

use crate::resolve::{RelationKind, Relationship};

/// Observer of the events produced while indexing and resolving.
///
/// Every method has an empty default, so implementors only override the
/// events they care about.
///
/// # Examples
///
/// ```
/// use classmap::progress::ProgressSink;
/// use classmap_core::{declaration::TypeKind, fqn::Fqn};
///
/// #[derive(Default)]
/// struct TypeCounter(usize);
///
/// impl ProgressSink for TypeCounter {
///     fn on_type(&mut self, _fqn: &Fqn, _kind: TypeKind) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait ProgressSink {
    /// A compilation unit is about to be indexed.
    fn on_unit(&mut self, _unit: &CompilationUnit) {}

    /// A type declaration was recorded in the index.
    fn on_type(&mut self, _fqn: &Fqn, _kind: TypeKind) {}

    /// A declaration replaced an earlier one with the same FQN.
    fn on_duplicate(&mut self, _fqn: &Fqn) {}

    /// A referenced type name could not be mapped to an indexed type.
    fn on_unresolved(&mut self, _source: &Fqn, _raw: &str, _kind: RelationKind) {}

    /// A relationship edge was derived.
    fn on_relationship(&mut self, _relationship: &Relationship) {}
}

/// A [`ProgressSink`] that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}
