//! Relationship derivation.
//!
//! The [`RelationshipResolver`] walks a [`DeclaredIndex`] in three passes:
//! inheritance and realization, nesting ownership, and associations. Every
//! pass visits packages and FQNs in index order, so the same input always
//! yields the same edges in the same order.

use std::fmt;

use log::{debug, trace};

use classmap_core::{
    declaration::{TypeBody, TypeDecl},
    fqn::Fqn,
};

use crate::{
    index::DeclaredIndex,
    progress::{NoProgress, ProgressSink},
};

/// The kind of a derived edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Extends,
    Implements,
    Owns,
    Associates,
}

impl RelationKind {
    /// Returns the PlantUML arrow drawn between the left and right ends.
    pub fn arrow(self) -> &'static str {
        match self {
            RelationKind::Extends => "<|--",
            RelationKind::Implements => "<|..",
            RelationKind::Owns => "+--",
            RelationKind::Associates => "-->",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationKind::Extends => "extends",
            RelationKind::Implements => "implements",
            RelationKind::Owns => "owns",
            RelationKind::Associates => "associates",
        };
        f.write_str(name)
    }
}

/// A directed edge between two indexed types.
///
/// For [`RelationKind::Extends`] and [`RelationKind::Implements`] the source
/// is the subtype and the target the supertype. For [`RelationKind::Owns`]
/// the source is the enclosing type, and for [`RelationKind::Associates`] it
/// is the type declaring the field or component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    source: Fqn,
    target: Fqn,
    kind: RelationKind,
    role: Option<String>,
    stereotypes: Vec<String>,
}

impl Relationship {
    pub fn new(source: Fqn, target: Fqn, kind: RelationKind) -> Self {
        Self {
            source,
            target,
            kind,
            role: None,
            stereotypes: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_stereotypes(mut self, stereotypes: Vec<String>) -> Self {
        self.stereotypes = stereotypes;
        self
    }

    pub fn source(&self) -> &Fqn {
        &self.source
    }

    pub fn target(&self) -> &Fqn {
        &self.target
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn stereotypes(&self) -> &[String] {
        &self.stereotypes
    }

    /// Returns the `(left, right)` ends as drawn around [`RelationKind::arrow`].
    ///
    /// The general end goes on the left for inheritance, the owner for
    /// nesting and associations.
    pub fn ends(&self) -> (&Fqn, &Fqn) {
        match self.kind {
            RelationKind::Extends | RelationKind::Implements => (&self.target, &self.source),
            RelationKind::Owns | RelationKind::Associates => (&self.source, &self.target),
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (left, right) = self.ends();
        write!(f, "\"{left}\" {} \"{right}\"", self.kind.arrow())?;
        if let Some(role) = &self.role {
            write!(f, " : {role}")?;
        }
        Ok(())
    }
}

/// Derives [`Relationship`]s from a [`DeclaredIndex`].
///
/// # Examples
///
/// ```
/// use classmap::{index::DeclaredIndex, resolve::RelationshipResolver};
/// use classmap_core::declaration::{CompilationUnit, TypeDecl};
///
/// let units = vec![
///     CompilationUnit::new("pa").with_type(TypeDecl::interface("A")),
///     CompilationUnit::new("pb").with_type(TypeDecl::class("B").with_implements("A")),
/// ];
/// let index = DeclaredIndex::build(&units).unwrap();
/// let edges = RelationshipResolver::new(&index).resolve_all();
///
/// assert_eq!(edges.len(), 1);
/// assert_eq!(edges[0].to_string(), r#""pa.A" <|.. "pb.B""#);
/// ```
pub struct RelationshipResolver<'i, 'a> {
    index: &'i DeclaredIndex<'a>,
}

impl<'i, 'a> RelationshipResolver<'i, 'a> {
    pub fn new(index: &'i DeclaredIndex<'a>) -> Self {
        Self { index }
    }

    /// Pass A: `extends` and `implements` edges.
    pub fn inheritance(&self) -> Vec<Relationship> {
        let mut edges = Vec::new();
        self.inheritance_into(&mut NoProgress, &mut edges);
        edges
    }

    /// Pass B: `owns` edges from enclosing types to their nested types.
    pub fn nesting(&self) -> Vec<Relationship> {
        let mut edges = Vec::new();
        self.nesting_into(&mut edges);
        edges
    }

    /// Pass C: associations from fields and record components.
    pub fn associations(&self) -> Vec<Relationship> {
        let mut edges = Vec::new();
        self.associations_into(&mut NoProgress, &mut edges);
        edges
    }

    /// Runs all three passes, in order.
    pub fn resolve_all(&self) -> Vec<Relationship> {
        self.resolve_with(&mut NoProgress)
    }

    /// Runs all three passes, reporting every edge and every dropped
    /// reference to `progress`.
    pub fn resolve_with(&self, progress: &mut dyn ProgressSink) -> Vec<Relationship> {
        let mut edges = Vec::new();
        self.inheritance_into(progress, &mut edges);
        let inheritance = edges.len();
        self.nesting_into(&mut edges);
        let nesting = edges.len() - inheritance;
        self.associations_into(progress, &mut edges);
        let associations = edges.len() - inheritance - nesting;

        for edge in &edges {
            progress.on_relationship(edge);
        }

        debug!(inheritance = inheritance, nesting = nesting, associations = associations; "Relationships resolved");
        edges
    }

    fn inheritance_into(&self, progress: &mut dyn ProgressSink, edges: &mut Vec<Relationship>) {
        for (package, fqn, decl) in self.index.iter() {
            let (extends, implements): (&[String], &[String]) = match decl.body() {
                TypeBody::Class {
                    extends,
                    implements,
                    ..
                } => (extends.as_slice(), implements.as_slice()),
                TypeBody::Interface { extends, .. } => (extends.as_slice(), &[]),
                TypeBody::Enum { implements, .. } => (&[], implements.as_slice()),
                TypeBody::Record { .. } | TypeBody::Annotation => continue,
            };

            let supertypes = extends
                .iter()
                .map(|raw| (raw, RelationKind::Extends))
                .chain(implements.iter().map(|raw| (raw, RelationKind::Implements)));

            for (raw, kind) in supertypes {
                if let Some(target) = self.resolve(progress, package, fqn, raw, kind) {
                    edges.push(Relationship::new(fqn.clone(), target, kind));
                }
            }
        }
    }

    fn nesting_into(&self, edges: &mut Vec<Relationship>) {
        for (_, fqn, _) in self.index.iter() {
            let Some(owner) = fqn.owner().and_then(|owner| self.index.fqn(owner)) else {
                continue;
            };
            edges.push(Relationship::new(owner.clone(), fqn.clone(), RelationKind::Owns));
        }
    }

    fn associations_into(&self, progress: &mut dyn ProgressSink, edges: &mut Vec<Relationship>) {
        for (package, fqn, decl) in self.index.iter() {
            for (role, raw, annotations) in structural_members(decl) {
                let kind = RelationKind::Associates;
                let Some(target) = self.resolve(progress, package, fqn, raw, kind) else {
                    continue;
                };
                edges.push(
                    Relationship::new(fqn.clone(), target, kind)
                        .with_role(role)
                        .with_stereotypes(annotations.to_vec()),
                );
            }
        }
    }

    /// Resolves `raw` for an edge starting at `source`, dropping unresolved
    /// names and self-references.
    fn resolve(
        &self,
        progress: &mut dyn ProgressSink,
        package: &str,
        source: &Fqn,
        raw: &str,
        kind: RelationKind,
    ) -> Option<Fqn> {
        let Some(target) = self.index.resolve_type_name(package, raw) else {
            trace!(source = source.as_str(), raw = raw, kind:% = kind; "Unresolved type reference");
            progress.on_unresolved(source, raw, kind);
            return None;
        };

        if &target == source {
            trace!(source = source.as_str(), kind:% = kind; "Self-referencing edge dropped");
            return None;
        }

        Some(target)
    }
}

/// Returns `(name, raw type, annotations)` for every member that can carry an
/// association: fields of classes, interfaces and enums, components of
/// records.
fn structural_members(decl: &TypeDecl) -> Vec<(&str, &str, &[String])> {
    match decl.body() {
        TypeBody::Class { fields, .. }
        | TypeBody::Interface { fields, .. }
        | TypeBody::Enum { fields, .. } => fields
            .iter()
            .map(|field| (field.name(), field.type_name(), field.annotations()))
            .collect(),
        TypeBody::Record { components, .. } => components
            .iter()
            .map(|component| {
                (
                    component.name(),
                    component.type_name(),
                    component.annotations(),
                )
            })
            .collect(),
        TypeBody::Annotation => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use classmap_core::declaration::{CompilationUnit, Field, RecordComponent};

    use super::*;

    fn lines(edges: &[Relationship]) -> Vec<String> {
        edges.iter().map(Relationship::to_string).collect()
    }

    #[derive(Default)]
    struct Unresolved(Vec<(String, String, RelationKind)>);

    impl ProgressSink for Unresolved {
        fn on_unresolved(&mut self, source: &Fqn, raw: &str, kind: RelationKind) {
            self.0.push((source.to_string(), raw.to_string(), kind));
        }
    }

    #[test]
    fn test_interface_realization_across_packages() {
        let units = vec![
            CompilationUnit::new("pa").with_type(TypeDecl::interface("A")),
            CompilationUnit::new("pb")
                .with_type(TypeDecl::class("B").with_implements("A"))
                .with_type(TypeDecl::enumeration("E").with_implements("A")),
        ];
        let index = DeclaredIndex::build(&units).unwrap();
        let resolver = RelationshipResolver::new(&index);

        assert_eq!(
            lines(&resolver.inheritance()),
            [r#""pa.A" <|.. "pb.B""#, r#""pa.A" <|.. "pb.E""#]
        );
        assert!(
            resolver
                .resolve_all()
                .iter()
                .all(|edge| edge.kind() != RelationKind::Extends)
        );
    }

    #[test]
    fn test_extends_and_interface_extension() {
        let units = vec![
            CompilationUnit::new("p")
                .with_type(TypeDecl::class("Base"))
                .with_type(
                    TypeDecl::class("Child")
                        .with_extends("Base<String>")
                        .with_implements("Marker"),
                )
                .with_type(TypeDecl::interface("Marker"))
                .with_type(TypeDecl::interface("Sub").with_extends("Marker").with_extends("Missing")),
        ];
        let index = DeclaredIndex::build(&units).unwrap();

        assert_eq!(
            lines(&RelationshipResolver::new(&index).inheritance()),
            [
                r#""p.Base" <|-- "p.Child""#,
                r#""p.Marker" <|.. "p.Child""#,
                r#""p.Marker" <|-- "p.Sub""#,
            ]
        );
    }

    #[test]
    fn test_unresolved_supertypes_are_reported_and_dropped() {
        let units = vec![
            CompilationUnit::new("p")
                .with_type(TypeDecl::class("A").with_extends("java.lang.Thread").with_implements("Runnable")),
        ];
        let index = DeclaredIndex::build(&units).unwrap();
        let mut unresolved = Unresolved::default();
        let edges = RelationshipResolver::new(&index).resolve_with(&mut unresolved);

        assert!(edges.is_empty());
        assert_eq!(
            unresolved.0,
            vec![
                ("p.A".to_string(), "java.lang.Thread".to_string(), RelationKind::Extends),
                ("p.A".to_string(), "Runnable".to_string(), RelationKind::Implements),
            ]
        );
    }

    #[test]
    fn test_self_inheritance_is_dropped() {
        let units = vec![
            CompilationUnit::new("p").with_type(TypeDecl::class("Loop").with_extends("Loop")),
        ];
        let index = DeclaredIndex::build(&units).unwrap();

        assert!(RelationshipResolver::new(&index).inheritance().is_empty());
    }

    #[test]
    fn test_records_and_annotations_have_no_inheritance_edges() {
        let units = vec![
            CompilationUnit::new("p")
                .with_type(TypeDecl::interface("Shape"))
                .with_type(TypeDecl::record("Circle").with_implements("Shape"))
                .with_type(TypeDecl::annotation("Audited")),
        ];
        let index = DeclaredIndex::build(&units).unwrap();

        assert!(RelationshipResolver::new(&index).inheritance().is_empty());
    }

    #[test]
    fn test_nesting_edges() {
        let units = vec![
            CompilationUnit::new("p")
                .with_type(
                    TypeDecl::class("Outer")
                        .with_nested(TypeDecl::class("Inner").with_nested(TypeDecl::enumeration("Deep"))),
                )
                .with_type(TypeDecl::class("Standalone")),
        ];
        let index = DeclaredIndex::build(&units).unwrap();

        assert_eq!(
            lines(&RelationshipResolver::new(&index).nesting()),
            [
                r#""p.Outer" +-- "p.Outer.Inner""#,
                r#""p.Outer.Inner" +-- "p.Outer.Inner.Deep""#,
            ]
        );
    }

    #[test]
    fn test_nesting_is_structural() {
        // `p.Outer` is both a type and, for the second unit, a package.
        let units = vec![
            CompilationUnit::new("p").with_type(TypeDecl::class("Outer")),
            CompilationUnit::new("p.Outer").with_type(TypeDecl::class("Shadow")),
        ];
        let index = DeclaredIndex::build(&units).unwrap();

        assert_eq!(
            lines(&RelationshipResolver::new(&index).nesting()),
            [r#""p.Outer" +-- "p.Outer.Shadow""#]
        );
    }

    #[test]
    fn test_field_associations_with_roles_and_stereotypes() {
        let units = vec![
            CompilationUnit::new("shop")
                .with_type(
                    TypeDecl::class("Order")
                        .with_field(Field::new("customer", "Customer").with_annotation("ManyToOne"))
                        .with_field(Field::new("lines", "List<Line>"))
                        .with_field(Field::new("items", "Line[]"))
                        .with_field(Field::new("parent", "Order"))
                        .with_field(Field::new("count", "int")),
                )
                .with_type(TypeDecl::class("Customer"))
                .with_type(TypeDecl::class("Line")),
        ];
        let index = DeclaredIndex::build(&units).unwrap();
        let edges = RelationshipResolver::new(&index).associations();

        assert_eq!(
            lines(&edges),
            [
                r#""shop.Order" --> "shop.Customer" : customer"#,
                r#""shop.Order" --> "shop.Line" : items"#,
            ]
        );
        assert_eq!(edges[0].stereotypes(), ["ManyToOne"]);
        assert!(edges[1].stereotypes().is_empty());
    }

    #[test]
    fn test_record_components_associate() {
        let units = vec![
            CompilationUnit::new("p")
                .with_type(
                    TypeDecl::record("Order")
                        .with_component(RecordComponent::new("customer", "Customer"))
                        .with_component(RecordComponent::new("note", "Note")),
                )
                .with_type(TypeDecl::class("Customer")),
        ];
        let index = DeclaredIndex::build(&units).unwrap();
        let mut unresolved = Unresolved::default();
        let edges = RelationshipResolver::new(&index).resolve_with(&mut unresolved);

        assert_eq!(lines(&edges), [r#""p.Order" --> "p.Customer" : customer"#]);
        assert_eq!(
            unresolved.0,
            vec![("p.Order".to_string(), "Note".to_string(), RelationKind::Associates)]
        );
    }

    #[test]
    fn test_enum_and_interface_fields_associate() {
        let units = vec![
            CompilationUnit::new("p")
                .with_type(
                    TypeDecl::enumeration("Status")
                        .with_constant("OPEN")
                        .with_field(Field::new("owner", "Team")),
                )
                .with_type(TypeDecl::interface("Defaults").with_field(Field::new("TEAM", "Team")))
                .with_type(TypeDecl::class("Team")),
        ];
        let index = DeclaredIndex::build(&units).unwrap();

        assert_eq!(
            lines(&RelationshipResolver::new(&index).associations()),
            [
                r#""p.Defaults" --> "p.Team" : TEAM"#,
                r#""p.Status" --> "p.Team" : owner"#,
            ]
        );
    }

    #[test]
    fn test_passes_run_in_order() {
        let units = vec![
            CompilationUnit::new("p")
                .with_type(
                    TypeDecl::class("A")
                        .with_extends("B")
                        .with_field(Field::new("b", "B"))
                        .with_nested(TypeDecl::class("N")),
                )
                .with_type(TypeDecl::class("B")),
        ];
        let index = DeclaredIndex::build(&units).unwrap();
        let kinds: Vec<RelationKind> = RelationshipResolver::new(&index)
            .resolve_all()
            .iter()
            .map(Relationship::kind)
            .collect();

        assert_eq!(
            kinds,
            [RelationKind::Extends, RelationKind::Owns, RelationKind::Associates]
        );
    }
}
